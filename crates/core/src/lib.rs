//! Exact posterior inference of gene copies and trait presence over a family
//! tree, by exhaustive enumeration of every evidence-consistent world.

pub mod error;
pub mod genetics;
pub mod inference;
pub mod model;
pub mod types;

pub use error::{HeredityError, Result};
pub use genetics::{Family, PersonRecord};
pub use inference::{infer, InferenceOptions, Posteriors};
pub use model::ModelParams;
pub use types::Genotype;
