pub mod family;
pub mod inheritance;

pub use family::{Family, PersonRecord};
pub use inheritance::{
    child_genotype_distribution, child_genotype_probability, transmission_probability,
    InheritanceTable,
};
