use rayon::prelude::*;
use serde::Serialize;

use crate::error::{HeredityError, Result};
use crate::genetics::Family;
use crate::types::PersonSet;

use super::accumulator::{Accumulator, Space};
use super::assignment::Assignment;
use super::joint::JointEvaluator;

/// Largest family the bitmask enumeration accepts.
pub const MAX_PEOPLE: usize = 32;

/// Family size at or above which outer trait partitions are spread across
/// the rayon thread pool.
const PARALLEL_THRESHOLD: usize = 8;

/// Number of worlds above which a warning about run time is logged.
const LARGE_ENUMERATION: f64 = 1e9;

/// Counters collected while enumerating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnumerationStats {
    /// Candidate trait-present sets visited (always `2^n`).
    pub trait_partitions: u64,
    /// Candidate trait-present sets that agree with the evidence.
    pub consistent_trait_partitions: u64,
    /// Joint probability evaluations performed.
    pub evaluations: u64,
}

impl EnumerationStats {
    fn merge(self, other: Self) -> Self {
        Self {
            trait_partitions: self.trait_partitions + other.trait_partitions,
            consistent_trait_partitions: self.consistent_trait_partitions
                + other.consistent_trait_partitions,
            evaluations: self.evaluations + other.evaluations,
        }
    }
}

/// Iterator over every subset of a set, from the full set down to the empty
/// set.
#[derive(Debug, Clone)]
pub struct Subsets {
    mask: PersonSet,
    next: Option<PersonSet>,
}

impl Iterator for Subsets {
    type Item = PersonSet;

    fn next(&mut self) -> Option<PersonSet> {
        let current = self.next?;
        self.next = if current == 0 {
            None
        } else {
            Some((current - 1) & self.mask)
        };
        Some(current)
    }
}

/// All `2^|mask|` subsets of `mask`.
pub fn subsets(mask: PersonSet) -> Subsets {
    Subsets {
        mask,
        next: Some(mask),
    }
}

/// Observed traits as bitmasks: who is observed, and who of those shows the
/// trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evidence {
    known: PersonSet,
    present: PersonSet,
}

impl Evidence {
    pub fn from_family(family: &Family) -> Self {
        let mut known = 0;
        let mut present = 0;
        for i in 0..family.len() {
            if let Some(t) = family.observed_trait(i) {
                known |= 1 << i;
                if t {
                    present |= 1 << i;
                }
            }
        }
        Self { known, present }
    }

    /// Whether a candidate trait-present set agrees with every observation.
    #[inline]
    pub fn admits(&self, have_trait: PersonSet) -> bool {
        (have_trait ^ self.present) & self.known == 0
    }
}

/// Exhaustive driver: visits every evidence-consistent world and credits its
/// joint probability to each person's marginal buckets.
///
/// For every trait-present set that survives the evidence check, every
/// one-copy set and every two-copy set disjoint from it is evaluated; the
/// remaining people carry zero copies. That is `3^n` evaluations per
/// consistent trait set.
pub struct Enumerator<'a> {
    evaluator: JointEvaluator<'a>,
    space: Space,
    parallel: bool,
}

impl<'a> Enumerator<'a> {
    pub fn new(evaluator: JointEvaluator<'a>, space: Space) -> Self {
        Self {
            evaluator,
            space,
            parallel: true,
        }
    }

    /// Allow or forbid spreading work over the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enumerate all worlds and return the unnormalized marginals.
    ///
    /// # Errors
    /// Returns [`HeredityError::PopulationTooLarge`] for families above
    /// [`MAX_PEOPLE`].
    pub fn run(&self) -> Result<(Accumulator, EnumerationStats)> {
        let n = self.evaluator.family().len();
        if n > MAX_PEOPLE {
            return Err(HeredityError::PopulationTooLarge {
                size: n,
                max: MAX_PEOPLE,
            });
        }

        let evidence = Evidence::from_family(self.evaluator.family());
        let everyone: PersonSet = (1 << n) - 1;
        let unknown = n - evidence.known.count_ones() as usize;
        let worlds = 3f64.powi(n as i32) * 2f64.powi(unknown as i32);
        if worlds > LARGE_ENUMERATION {
            log::warn!(
                "Enumerating {:.3e} worlds for a family of {}; this may take a long time",
                worlds,
                n
            );
        }

        let (acc, stats) = if self.parallel && n >= PARALLEL_THRESHOLD {
            (0..=everyone)
                .into_par_iter()
                .fold(
                    || (Accumulator::new(n, self.space), EnumerationStats::default()),
                    |(mut acc, mut stats), have_trait| {
                        self.visit_trait_partition(
                            &evidence, have_trait, everyone, &mut acc, &mut stats,
                        );
                        (acc, stats)
                    },
                )
                .reduce(
                    || (Accumulator::new(n, self.space), EnumerationStats::default()),
                    |(a, sa), (b, sb)| (a.merge(b), sa.merge(sb)),
                )
        } else {
            let mut acc = Accumulator::new(n, self.space);
            let mut stats = EnumerationStats::default();
            for have_trait in 0..=everyone {
                self.visit_trait_partition(&evidence, have_trait, everyone, &mut acc, &mut stats);
            }
            (acc, stats)
        };

        log::debug!(
            "Visited {} trait partitions, {} consistent with evidence, {} evaluations",
            stats.trait_partitions,
            stats.consistent_trait_partitions,
            stats.evaluations
        );

        Ok((acc, stats))
    }

    fn visit_trait_partition(
        &self,
        evidence: &Evidence,
        have_trait: PersonSet,
        everyone: PersonSet,
        acc: &mut Accumulator,
        stats: &mut EnumerationStats,
    ) {
        stats.trait_partitions += 1;
        if !evidence.admits(have_trait) {
            return;
        }
        stats.consistent_trait_partitions += 1;

        for one_copy in subsets(everyone) {
            for two_copies in subsets(everyone & !one_copy) {
                let assignment = Assignment::new(one_copy, two_copies, have_trait);
                let mass = match self.space {
                    Space::Linear => self.evaluator.joint_probability(&assignment),
                    Space::Log => self.evaluator.log_joint_probability(&assignment),
                };
                acc.add(&assignment, mass);
                stats.evaluations += 1;
            }
        }
    }
}
