use crate::types::{Genotype, PersonSet};

/// One fully specified world: every person's genotype and trait state.
///
/// Stored as three disjoint-or-complementary bitmasks over family indices.
/// People in neither `one_copy` nor `two_copies` carry zero copies, people
/// outside `trait_present` lack the trait, so every person lands in exactly
/// one class of each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    one_copy: PersonSet,
    two_copies: PersonSet,
    trait_present: PersonSet,
}

impl Assignment {
    /// # Panics
    /// Panics in debug builds if `one_copy` and `two_copies` overlap.
    pub fn new(one_copy: PersonSet, two_copies: PersonSet, trait_present: PersonSet) -> Self {
        debug_assert_eq!(one_copy & two_copies, 0, "genotype classes must be disjoint");
        Self {
            one_copy,
            two_copies,
            trait_present,
        }
    }

    /// Build an assignment from per-person classes, indexed like the family.
    ///
    /// # Panics
    /// Panics if the slices differ in length or exceed 64 people.
    pub fn from_classes(genotypes: &[Genotype], traits: &[bool]) -> Self {
        assert_eq!(genotypes.len(), traits.len());
        assert!(genotypes.len() <= PersonSet::BITS as usize);

        let mut one_copy = 0;
        let mut two_copies = 0;
        let mut trait_present = 0;
        for (i, (&g, &t)) in genotypes.iter().zip(traits).enumerate() {
            let bit: PersonSet = 1 << i;
            match g {
                Genotype::Zero => {}
                Genotype::One => one_copy |= bit,
                Genotype::Two => two_copies |= bit,
            }
            if t {
                trait_present |= bit;
            }
        }
        Self::new(one_copy, two_copies, trait_present)
    }

    #[inline]
    pub fn genotype(&self, person: usize) -> Genotype {
        let bit: PersonSet = 1 << person;
        if self.one_copy & bit != 0 {
            Genotype::One
        } else if self.two_copies & bit != 0 {
            Genotype::Two
        } else {
            Genotype::Zero
        }
    }

    #[inline]
    pub fn has_trait(&self, person: usize) -> bool {
        self.trait_present & (1 << person) != 0
    }

    pub fn one_copy(&self) -> PersonSet {
        self.one_copy
    }

    pub fn two_copies(&self) -> PersonSet {
        self.two_copies
    }

    pub fn trait_present(&self) -> PersonSet {
        self.trait_present
    }
}
