use crate::types::Genotype;

/// Probability that a parent with `parent` copies passes a copy of the gene
/// to a child.
///
/// A parent without the gene passes it only through mutation, a parent with
/// two copies passes it unless it mutates away. A one-copy parent passes it
/// with probability exactly 0.5: either allele may be picked and mutation in
/// either direction balances out, so `mutation_rate` does not appear.
pub fn transmission_probability(parent: Genotype, mutation_rate: f64) -> f64 {
    match parent {
        Genotype::Zero => mutation_rate,
        Genotype::One => 0.5,
        Genotype::Two => 1.0 - mutation_rate,
    }
}

/// Distribution over the child's genotype, indexed by copy count.
///
/// Each parent transmits independently, so with `p_m` and `p_f` the
/// transmission probabilities of mother and father:
///
/// ```text
/// P(0) = (1 - p_m)(1 - p_f)
/// P(1) = p_m(1 - p_f) + (1 - p_m)p_f
/// P(2) = p_m p_f
/// ```
pub fn child_genotype_distribution(mother: Genotype, father: Genotype, mutation_rate: f64) -> [f64; 3] {
    let p_m = transmission_probability(mother, mutation_rate);
    let p_f = transmission_probability(father, mutation_rate);
    [
        (1.0 - p_m) * (1.0 - p_f),
        p_m * (1.0 - p_f) + (1.0 - p_m) * p_f,
        p_m * p_f,
    ]
}

/// Probability that a child of `mother` and `father` carries `child` copies.
pub fn child_genotype_probability(
    mother: Genotype,
    father: Genotype,
    child: Genotype,
    mutation_rate: f64,
) -> f64 {
    child_genotype_distribution(mother, father, mutation_rate)[child.copies()]
}

/// Precomputed child genotype probabilities for all 27 parent/child
/// combinations at a fixed mutation rate.
#[derive(Debug, Clone, Copy)]
pub struct InheritanceTable {
    table: [[[f64; 3]; 3]; 3],
}

impl InheritanceTable {
    pub fn new(mutation_rate: f64) -> Self {
        let mut table = [[[0.0; 3]; 3]; 3];
        for mother in Genotype::ALL {
            for father in Genotype::ALL {
                table[mother.copies()][father.copies()] =
                    child_genotype_distribution(mother, father, mutation_rate);
            }
        }
        Self { table }
    }

    #[inline]
    pub fn get(&self, mother: Genotype, father: Genotype, child: Genotype) -> f64 {
        self.table[mother.copies()][father.copies()][child.copies()]
    }
}
