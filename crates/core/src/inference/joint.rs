use crate::genetics::{Family, InheritanceTable};
use crate::model::ModelParams;
use crate::types::Genotype;

use super::assignment::Assignment;

/// Evaluates the probability of fully specified assignments over a family.
///
/// Each person contributes a local factor: their genotype probability
/// (the prior for founders, the inheritance probability given both parents'
/// genotypes *in the same assignment* otherwise) times the probability of
/// their trait state given their genotype. The joint probability is the
/// product of all local factors.
#[derive(Debug, Clone)]
pub struct JointEvaluator<'a> {
    family: &'a Family,
    params: &'a ModelParams,
    inheritance: InheritanceTable,
}

impl<'a> JointEvaluator<'a> {
    pub fn new(family: &'a Family, params: &'a ModelParams) -> Self {
        Self {
            family,
            params,
            inheritance: InheritanceTable::new(params.mutation_rate),
        }
    }

    pub fn family(&self) -> &'a Family {
        self.family
    }

    /// Local factor of `person` under `assignment`.
    pub fn local_probability(&self, person: usize, assignment: &Assignment) -> f64 {
        let genotype = assignment.genotype(person);
        let genotype_p = self.genotype_probability(person, genotype, assignment);
        genotype_p * self.params.trait_probability(genotype, assignment.has_trait(person))
    }

    fn genotype_probability(&self, person: usize, genotype: Genotype, assignment: &Assignment) -> f64 {
        match self.family.parents(person) {
            None => self.params.prior(genotype),
            Some((mother, father)) => self.inheritance.get(
                assignment.genotype(mother),
                assignment.genotype(father),
                genotype,
            ),
        }
    }

    /// Probability of the whole assignment.
    pub fn joint_probability(&self, assignment: &Assignment) -> f64 {
        (0..self.family.len())
            .map(|i| self.local_probability(i, assignment))
            .product()
    }

    /// Natural log of the probability of the whole assignment.
    ///
    /// Summing logs keeps very small joint probabilities representable for
    /// larger families. Returns `-inf` for impossible assignments.
    pub fn log_joint_probability(&self, assignment: &Assignment) -> f64 {
        (0..self.family.len())
            .map(|i| self.local_probability(i, assignment).ln())
            .sum()
    }
}

/// Probability of one assignment over `family` under `params`.
pub fn joint_probability(family: &Family, params: &ModelParams, assignment: &Assignment) -> f64 {
    JointEvaluator::new(family, params).joint_probability(assignment)
}
