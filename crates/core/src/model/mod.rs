pub mod params;

pub use params::{
    ModelParams, DEFAULT_GENOTYPE_PRIOR, DEFAULT_MUTATION_RATE, DEFAULT_TRAIT_GIVEN_GENOTYPE,
};
