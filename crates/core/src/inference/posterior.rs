use std::fmt::Write;

use serde::Serialize;

use crate::genetics::Family;
use crate::types::Genotype;

use super::accumulator::Accumulator;
use super::enumerate::EnumerationStats;

/// Posterior marginals of one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonPosterior {
    pub name: String,
    /// P(genotype | evidence), indexed by copy count.
    pub genotype: [f64; 3],
    /// P(trait present | evidence).
    pub trait_present: f64,
    /// P(trait absent | evidence).
    pub trait_absent: f64,
}

impl PersonPosterior {
    pub fn genotype_probability(&self, genotype: Genotype) -> f64 {
        self.genotype[genotype.copies()]
    }

    /// Most probable genotype; ties go to fewer copies.
    pub fn most_likely_genotype(&self) -> Genotype {
        let mut best = Genotype::Zero;
        for g in Genotype::ALL {
            if self.genotype_probability(g) > self.genotype_probability(best) {
                best = g;
            }
        }
        best
    }
}

/// The result of inference over a family.
#[derive(Debug, Clone, Serialize)]
pub struct Posteriors {
    /// One entry per person, in family order.
    pub people: Vec<PersonPosterior>,
    /// Counters from the enumeration.
    pub stats: EnumerationStats,
}

impl Posteriors {
    /// Collect posteriors from a normalized accumulator.
    pub fn from_accumulator(family: &Family, acc: &Accumulator, stats: EnumerationStats) -> Self {
        let people = (0..family.len())
            .map(|i| PersonPosterior {
                name: family.name(i).to_string(),
                genotype: acc.genotype_row(i),
                trait_present: acc.trait_mass(i, true),
                trait_absent: acc.trait_mass(i, false),
            })
            .collect();
        Self { people, stats }
    }

    /// Look up a person's posterior by name.
    pub fn get(&self, name: &str) -> Option<&PersonPosterior> {
        self.people.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Render every person's distributions with four decimals, highest gene
    /// count first.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        for person in &self.people {
            let _ = writeln!(s, "{}:", person.name);
            s.push_str("  Gene:\n");
            for g in Genotype::ALL.iter().rev() {
                let _ = writeln!(s, "    {}: {:.4}", g.copies(), person.genotype_probability(*g));
            }
            s.push_str("  Trait:\n");
            let _ = writeln!(s, "    True: {:.4}", person.trait_present);
            let _ = writeln!(s, "    False: {:.4}", person.trait_absent);
        }
        s
    }
}
