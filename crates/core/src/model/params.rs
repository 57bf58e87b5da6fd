use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HeredityError, Result};
use crate::types::Genotype;

/// Unconditional probability of carrying 0, 1 or 2 copies of the gene.
pub const DEFAULT_GENOTYPE_PRIOR: [f64; 3] = [0.96, 0.03, 0.01];

/// Probability of showing the trait given 0, 1 or 2 copies of the gene.
pub const DEFAULT_TRAIT_GIVEN_GENOTYPE: [f64; 3] = [0.01, 0.56, 0.65];

/// Probability that a transmitted copy flips in transit.
pub const DEFAULT_MUTATION_RATE: f64 = 0.01;

const SUM_TOLERANCE: f64 = 1e-9;

/// Probability model of the gene and the trait it influences.
///
/// The defaults reproduce the reference tables exactly. Every field can be
/// overridden, e.g. from a JSON file where missing fields keep their
/// defaults:
///
/// ```text
/// { "mutation_rate": 0.02 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Prior over genotype, indexed by copy count.
    pub genotype_prior: [f64; 3],
    /// P(trait present | genotype), indexed by copy count. The trait-absent
    /// row is the complement.
    pub trait_given_genotype: [f64; 3],
    /// Mutation rate applied to each transmitted copy.
    pub mutation_rate: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            genotype_prior: DEFAULT_GENOTYPE_PRIOR,
            trait_given_genotype: DEFAULT_TRAIT_GIVEN_GENOTYPE,
            mutation_rate: DEFAULT_MUTATION_RATE,
        }
    }
}

impl ModelParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mutation rate.
    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    /// Unconditional probability of `genotype`.
    pub fn prior(&self, genotype: Genotype) -> f64 {
        self.genotype_prior[genotype.copies()]
    }

    /// Probability of the given trait state conditional on `genotype`.
    pub fn trait_probability(&self, genotype: Genotype, present: bool) -> f64 {
        let p = self.trait_given_genotype[genotype.copies()];
        if present {
            p
        } else {
            1.0 - p
        }
    }

    /// Check that every entry is a probability and that the prior sums to one.
    ///
    /// # Errors
    /// Returns [`HeredityError::InvalidParameter`] describing the first
    /// offending value.
    pub fn validate(&self) -> Result<()> {
        let entries = self
            .genotype_prior
            .iter()
            .enumerate()
            .map(|(g, &p)| (format!("genotype_prior[{}]", g), p))
            .chain(
                self.trait_given_genotype
                    .iter()
                    .enumerate()
                    .map(|(g, &p)| (format!("trait_given_genotype[{}]", g), p)),
            )
            .chain(std::iter::once(("mutation_rate".to_string(), self.mutation_rate)));

        for (name, p) in entries {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(HeredityError::InvalidParameter(format!(
                    "{} = {} is not a probability",
                    name, p
                )));
            }
        }

        let total: f64 = self.genotype_prior.iter().sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(HeredityError::InvalidParameter(format!(
                "genotype_prior sums to {} instead of 1",
                total
            )));
        }

        Ok(())
    }

    /// Read parameters from a JSON file and validate them.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds out-of-range values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let params: Self = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }
}
