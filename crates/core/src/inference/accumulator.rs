use crate::error::{HeredityError, Result};
use crate::types::{DenseMatrix, Genotype};

use super::assignment::Assignment;

/// Representation of the probability mass held in accumulator buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Plain probabilities, summed directly.
    Linear,
    /// Natural logs of probabilities, summed with log-sum-exp.
    Log,
}

impl Space {
    /// Value of an empty bucket.
    fn zero(self) -> f64 {
        match self {
            Space::Linear => 0.0,
            Space::Log => f64::NEG_INFINITY,
        }
    }

    /// Add `mass` into `bucket`.
    #[inline]
    fn add(self, bucket: &mut f64, mass: f64) {
        match self {
            Space::Linear => *bucket += mass,
            Space::Log => *bucket = log_add_exp(*bucket, mass),
        }
    }
}

/// `ln(exp(a) + exp(b))` without overflow or underflow.
#[inline]
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// Per-person unnormalized marginal mass.
///
/// Row `i` of `genotype` holds the mass for 0, 1 and 2 copies; row `i` of
/// `traits` the mass for trait present and absent. After [`normalize`]
/// every row is a probability distribution in linear space.
///
/// [`normalize`]: Accumulator::normalize
#[derive(Debug, Clone)]
pub struct Accumulator {
    space: Space,
    genotype: DenseMatrix,
    traits: DenseMatrix,
}

impl Accumulator {
    /// An empty accumulator for `n_people` people.
    pub fn new(n_people: usize, space: Space) -> Self {
        Self {
            space,
            genotype: DenseMatrix::from_element(n_people, 3, space.zero()),
            traits: DenseMatrix::from_element(n_people, 2, space.zero()),
        }
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn n_people(&self) -> usize {
        self.genotype.nrows()
    }

    /// Credit `mass` (expressed in this accumulator's space) to the genotype
    /// and trait bucket each person occupies in `assignment`.
    pub fn add(&mut self, assignment: &Assignment, mass: f64) {
        for i in 0..self.n_people() {
            let g = assignment.genotype(i).copies();
            let t = trait_column(assignment.has_trait(i));
            self.space.add(&mut self.genotype[(i, g)], mass);
            self.space.add(&mut self.traits[(i, t)], mass);
        }
    }

    /// Sum another shard into this one.
    ///
    /// # Panics
    /// Panics if the shards differ in size or space.
    pub fn merge(mut self, other: Accumulator) -> Self {
        assert_eq!(self.space, other.space, "cannot merge accumulators in different spaces");
        assert_eq!(self.n_people(), other.n_people());
        match self.space {
            Space::Linear => {
                self.genotype += &other.genotype;
                self.traits += &other.traits;
            }
            Space::Log => {
                self.genotype.zip_apply(&other.genotype, |a, b| *a = log_add_exp(*a, b));
                self.traits.zip_apply(&other.traits, |a, b| *a = log_add_exp(*a, b));
            }
        }
        self
    }

    /// Rescale every person's genotype and trait distribution to sum to one,
    /// in place. A log-space accumulator is converted to linear space.
    ///
    /// # Errors
    /// Returns [`HeredityError::DegenerateEvidence`] if any distribution has
    /// zero total mass, meaning the evidence is impossible under the model.
    pub fn normalize(&mut self) -> Result<()> {
        let space = self.space;
        for i in 0..self.n_people() {
            normalize_row(&mut self.genotype, i, space)?;
            normalize_row(&mut self.traits, i, space)?;
        }
        self.space = Space::Linear;
        Ok(())
    }

    /// Genotype bucket values of `person`, indexed by copy count.
    pub fn genotype_row(&self, person: usize) -> [f64; 3] {
        [
            self.genotype[(person, 0)],
            self.genotype[(person, 1)],
            self.genotype[(person, 2)],
        ]
    }

    /// Bucket value of `person` for `genotype`.
    pub fn genotype_mass(&self, person: usize, genotype: Genotype) -> f64 {
        self.genotype[(person, genotype.copies())]
    }

    /// Trait bucket value of `person` for the given trait state.
    pub fn trait_mass(&self, person: usize, present: bool) -> f64 {
        self.traits[(person, trait_column(present))]
    }
}

#[inline]
fn trait_column(present: bool) -> usize {
    if present {
        0
    } else {
        1
    }
}

fn normalize_row(m: &mut DenseMatrix, row: usize, space: Space) -> Result<()> {
    let mut r = m.row_mut(row);
    match space {
        Space::Linear => {
            let total = r.sum();
            if !(total > 0.0) || !total.is_finite() {
                return Err(HeredityError::DegenerateEvidence { index: row });
            }
            r /= total;
        }
        Space::Log => {
            let max = r.max();
            if !max.is_finite() {
                return Err(HeredityError::DegenerateEvidence { index: row });
            }
            r.apply(|x| *x = (*x - max).exp());
            let total = r.sum();
            r /= total;
        }
    }
    Ok(())
}
