use serde::{Deserialize, Serialize};

/// The scalar type used throughout the library.
pub type Scalar = f64;

/// Dense matrix type (column-major).
pub type DenseMatrix = nalgebra::DMatrix<Scalar>;

/// A set of people encoded as a bitmask over family indices.
pub type PersonSet = u64;

/// Number of copies of the gene a person carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genotype {
    Zero,
    One,
    Two,
}

impl Genotype {
    /// All genotypes in ascending copy count.
    pub const ALL: [Genotype; 3] = [Genotype::Zero, Genotype::One, Genotype::Two];

    /// Number of gene copies (0, 1 or 2).
    pub fn copies(self) -> usize {
        match self {
            Genotype::Zero => 0,
            Genotype::One => 1,
            Genotype::Two => 2,
        }
    }

    pub fn from_copies(copies: usize) -> Option<Self> {
        match copies {
            0 => Some(Genotype::Zero),
            1 => Some(Genotype::One),
            2 => Some(Genotype::Two),
            _ => None,
        }
    }
}
