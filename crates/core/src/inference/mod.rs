pub mod accumulator;
pub mod assignment;
pub mod enumerate;
pub mod joint;
pub mod posterior;

pub use accumulator::{Accumulator, Space};
pub use assignment::Assignment;
pub use enumerate::{EnumerationStats, Enumerator, MAX_PEOPLE};
pub use joint::{joint_probability, JointEvaluator};
pub use posterior::{PersonPosterior, Posteriors};

use crate::error::Result;
use crate::genetics::Family;
use crate::model::ModelParams;

/// Family size above which [`Accumulation::Auto`] switches to log space.
const LOG_SPACE_THRESHOLD: usize = 12;

/// How probability mass is summed during enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accumulation {
    /// Sum plain probabilities.
    Linear,
    /// Sum logarithms with log-sum-exp.
    LogSpace,
    /// Linear for small families, log space above 12 people.
    #[default]
    Auto,
}

/// Options controlling a call to [`infer`].
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    params: ModelParams,
    accumulation: Accumulation,
    parallel: bool,
}

impl InferenceOptions {
    /// Default model, automatic accumulation, parallel enumeration allowed.
    pub fn new() -> Self {
        Self {
            params: ModelParams::default(),
            accumulation: Accumulation::Auto,
            parallel: true,
        }
    }

    pub fn params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    pub fn accumulation(mut self, accumulation: Accumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn model_params(&self) -> &ModelParams {
        &self.params
    }

    /// Accumulation space used for a family of `n_people`.
    pub fn space_for(&self, n_people: usize) -> Space {
        match self.accumulation {
            Accumulation::Linear => Space::Linear,
            Accumulation::LogSpace => Space::Log,
            Accumulation::Auto if n_people > LOG_SPACE_THRESHOLD => Space::Log,
            Accumulation::Auto => Space::Linear,
        }
    }
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute every person's posterior genotype and trait distribution given
/// the observed traits in `family`.
///
/// # Errors
/// Returns an error if the model parameters are invalid, the family is too
/// large to enumerate, or the evidence has zero probability under the model.
pub fn infer(family: &Family, options: &InferenceOptions) -> Result<Posteriors> {
    options.params.validate()?;

    let space = options.space_for(family.len());
    if space == Space::Log && options.accumulation == Accumulation::Auto {
        log::info!(
            "Family of {} people: accumulating in log space",
            family.len()
        );
    }

    let evaluator = JointEvaluator::new(family, &options.params);
    let (mut acc, stats) = Enumerator::new(evaluator, space)
        .parallel(options.parallel)
        .run()?;
    acc.normalize()?;

    Ok(Posteriors::from_accumulator(family, &acc, stats))
}
