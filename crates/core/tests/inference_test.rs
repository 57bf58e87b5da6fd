//! Integration test: posterior inference over small families checked against
//! hand-computed values.
//!
//! Family used in several tests (three people):
//!   Harry  mother=Lily father=James  trait=unknown
//!   James  founder                   trait=present
//!   Lily   founder                   trait=absent
//!
//! James' posterior depends only on his own trait because Harry is
//! unobserved:
//!   P(g | trait) ∝ prior(g) * P(trait | g) = (0.0096, 0.0168, 0.0065) / 0.0329
//!
//! Lily likewise:
//!   (0.9504, 0.0132, 0.0035) / 0.9671
//!
//! Harry's distribution follows from each parent's posterior probability of
//! passing the gene on:
//!   p_James = (0.0096*0.01 + 0.0168*0.5 + 0.0065*0.99) / 0.0329 = 0.453829...
//!   p_Lily  = (0.9504*0.01 + 0.0132*0.5 + 0.0035*0.99) / 0.9671 = 0.020235...
//!   P(Harry=2) = p_James * p_Lily = 0.0092 (4 d.p.)

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};

use heredity_core::inference::{infer, Accumulation, InferenceOptions, Posteriors};
use heredity_core::{Family, Genotype, HeredityError, ModelParams, PersonRecord};

fn potter_family() -> Family {
    Family::from_records(&[
        PersonRecord::new("Harry").with_parents("Lily", "James"),
        PersonRecord::new("James").with_trait(true),
        PersonRecord::new("Lily").with_trait(false),
    ])
    .unwrap()
}

/// Three generations, five people.
fn weasley_family(evidence: &[Option<bool>; 5]) -> Family {
    let mut records = vec![
        PersonRecord::new("Arthur"),
        PersonRecord::new("Molly"),
        PersonRecord::new("Ron").with_parents("Molly", "Arthur"),
        PersonRecord::new("Hermione"),
        PersonRecord::new("Rose").with_parents("Hermione", "Ron"),
    ];
    for (rec, &t) in records.iter_mut().zip(evidence) {
        rec.observed_trait = t;
    }
    Family::from_records(&records).unwrap()
}

fn assert_valid_distributions(posteriors: &Posteriors) {
    for p in &posteriors.people {
        let gene_sum: f64 = p.genotype.iter().sum();
        assert_relative_eq!(gene_sum, 1.0, epsilon = 1e-9);
        assert_relative_eq!(p.trait_present + p.trait_absent, 1.0, epsilon = 1e-9);
        for &v in p.genotype.iter().chain([p.trait_present, p.trait_absent].iter()) {
            assert!((0.0..=1.0 + 1e-12).contains(&v), "{} has value {}", p.name, v);
        }
    }
}

#[test]
fn test_potter_family_reference_values() {
    let posteriors = infer(&potter_family(), &InferenceOptions::new()).unwrap();
    assert_valid_distributions(&posteriors);

    let harry = posteriors.get("Harry").unwrap();
    assert_relative_eq!(harry.genotype_probability(Genotype::Two), 0.0092, epsilon = 1e-4);
    assert_relative_eq!(harry.genotype_probability(Genotype::One), 0.4557, epsilon = 1e-4);
    assert_relative_eq!(harry.genotype_probability(Genotype::Zero), 0.5351, epsilon = 1e-4);
    assert_relative_eq!(harry.trait_present, 0.2665, epsilon = 1e-4);
    assert_relative_eq!(harry.trait_absent, 0.7335, epsilon = 1e-4);

    let james = posteriors.get("James").unwrap();
    assert_relative_eq!(james.genotype[0], 0.0096 / 0.0329, epsilon = 1e-12);
    assert_relative_eq!(james.genotype[1], 0.0168 / 0.0329, epsilon = 1e-12);
    assert_relative_eq!(james.genotype[2], 0.0065 / 0.0329, epsilon = 1e-12);
    assert_relative_eq!(james.trait_present, 1.0, epsilon = 1e-12);
    assert_relative_eq!(james.trait_absent, 0.0, epsilon = 1e-12);

    let lily = posteriors.get("Lily").unwrap();
    assert_relative_eq!(lily.genotype[0], 0.9504 / 0.9671, epsilon = 1e-12);
    assert_relative_eq!(lily.genotype[1], 0.0132 / 0.9671, epsilon = 1e-12);
    assert_relative_eq!(lily.genotype[2], 0.0035 / 0.9671, epsilon = 1e-12);
    assert_relative_eq!(lily.trait_absent, 1.0, epsilon = 1e-12);
}

#[test]
fn test_single_person_with_trait() {
    let family = Family::from_records(&[PersonRecord::new("Solo").with_trait(true)]).unwrap();
    let posteriors = infer(&family, &InferenceOptions::new()).unwrap();
    let solo = posteriors.get("Solo").unwrap();

    assert_relative_eq!(solo.genotype_probability(Genotype::One), 0.0168 / 0.0329, epsilon = 1e-12);
    assert_relative_eq!(solo.genotype_probability(Genotype::One), 0.5106, epsilon = 1e-4);
    assert_relative_eq!(solo.genotype_probability(Genotype::Two), 0.0065 / 0.0329, epsilon = 1e-12);
    assert_relative_eq!(solo.genotype_probability(Genotype::Zero), 0.0096 / 0.0329, epsilon = 1e-12);
}

#[test]
fn test_no_evidence_founders_keep_prior() {
    let family = Family::from_records(&[
        PersonRecord::new("Child").with_parents("Mum", "Dad"),
        PersonRecord::new("Mum"),
        PersonRecord::new("Dad"),
    ])
    .unwrap();
    let posteriors = infer(&family, &InferenceOptions::new()).unwrap();
    assert_valid_distributions(&posteriors);

    for name in ["Mum", "Dad"] {
        let p = posteriors.get(name).unwrap();
        assert_relative_eq!(p.genotype[0], 0.96, epsilon = 1e-12);
        assert_relative_eq!(p.genotype[1], 0.03, epsilon = 1e-12);
        assert_relative_eq!(p.genotype[2], 0.01, epsilon = 1e-12);
        assert_relative_eq!(p.trait_present, 0.0329, epsilon = 1e-12);
    }

    // Each founder passes the gene with probability
    // 0.96*0.01 + 0.03*0.5 + 0.01*0.99 = 0.0345.
    let child = posteriors.get("Child").unwrap();
    assert_relative_eq!(child.genotype[2], 0.0345 * 0.0345, epsilon = 1e-12);
    assert_relative_eq!(child.genotype[1], 2.0 * 0.0345 * 0.9655, epsilon = 1e-12);
    assert_relative_eq!(child.genotype[0], 0.9655 * 0.9655, epsilon = 1e-12);
    assert_relative_eq!(
        child.trait_present,
        0.93219025 * 0.01 + 0.0666195 * 0.56 + 0.00119025 * 0.65,
        epsilon = 1e-12
    );
}

#[test]
fn test_fully_observed_family_has_single_trait_partition() {
    let family = weasley_family(&[Some(false), Some(true), Some(true), Some(false), Some(false)]);
    let posteriors = infer(&family, &InferenceOptions::new()).unwrap();

    assert_eq!(posteriors.stats.trait_partitions, 32);
    assert_eq!(posteriors.stats.consistent_trait_partitions, 1);
    assert_eq!(posteriors.stats.evaluations, 243);
    assert_valid_distributions(&posteriors);
    assert_relative_eq!(posteriors.get("Ron").unwrap().trait_present, 1.0, epsilon = 1e-12);
}

#[test]
fn test_log_space_agrees_with_linear() {
    let family = weasley_family(&[None, Some(true), None, Some(false), Some(true)]);
    let linear = infer(
        &family,
        &InferenceOptions::new().accumulation(Accumulation::Linear),
    )
    .unwrap();
    let log = infer(
        &family,
        &InferenceOptions::new().accumulation(Accumulation::LogSpace),
    )
    .unwrap();

    for (a, b) in linear.people.iter().zip(&log.people) {
        for g in 0..3 {
            assert_relative_eq!(a.genotype[g], b.genotype[g], epsilon = 1e-12);
        }
        assert_relative_eq!(a.trait_present, b.trait_present, epsilon = 1e-12);
    }
}

#[test]
fn test_parallel_agrees_with_sequential() {
    // Nine people, seven observed: large enough to take the parallel path.
    let family = Family::from_records(&[
        PersonRecord::new("G1").with_trait(false),
        PersonRecord::new("G2").with_trait(true),
        PersonRecord::new("G3").with_trait(false),
        PersonRecord::new("G4").with_trait(false),
        PersonRecord::new("P1").with_parents("G2", "G1").with_trait(true),
        PersonRecord::new("P2").with_parents("G4", "G3").with_trait(false),
        PersonRecord::new("C1").with_parents("P2", "P1"),
        PersonRecord::new("C2").with_parents("P2", "P1").with_trait(true),
        PersonRecord::new("C3").with_parents("P2", "P1"),
    ])
    .unwrap();

    let sequential = infer(&family, &InferenceOptions::new().parallel(false)).unwrap();
    let parallel = infer(&family, &InferenceOptions::new().parallel(true)).unwrap();

    assert_eq!(sequential.stats, parallel.stats);
    assert_eq!(parallel.stats.consistent_trait_partitions, 4);
    assert_eq!(parallel.stats.evaluations, 4 * 19683);
    for (a, b) in sequential.people.iter().zip(&parallel.people) {
        assert_eq!(a.name, b.name);
        for g in 0..3 {
            assert_relative_eq!(a.genotype[g], b.genotype[g], epsilon = 1e-12);
        }
        assert_relative_eq!(a.trait_present, b.trait_present, epsilon = 1e-12);
    }
    assert_valid_distributions(&parallel);

    // Siblings with identical evidence share a posterior.
    let c1 = parallel.get("C1").unwrap();
    let c3 = parallel.get("C3").unwrap();
    for g in 0..3 {
        assert_relative_eq!(c1.genotype[g], c3.genotype[g], epsilon = 1e-12);
    }
}

#[test]
fn test_random_evidence_always_normalizes() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut evidence = [None; 5];
        for e in evidence.iter_mut() {
            *e = match rng.gen_range(0..3) {
                0 => None,
                1 => Some(true),
                _ => Some(false),
            };
        }
        let family = weasley_family(&evidence);
        let posteriors = infer(&family, &InferenceOptions::new()).unwrap();
        assert_valid_distributions(&posteriors);

        for (p, e) in posteriors.people.iter().zip(evidence.iter()) {
            match e {
                Some(true) => assert_relative_eq!(p.trait_present, 1.0, epsilon = 1e-12),
                Some(false) => assert_relative_eq!(p.trait_absent, 1.0, epsilon = 1e-12),
                None => {}
            }
        }
    }
}

#[test]
fn test_swapping_parents_does_not_change_posteriors() {
    let forward = Family::from_records(&[
        PersonRecord::new("Kid").with_parents("A", "B").with_trait(true),
        PersonRecord::new("A").with_trait(true),
        PersonRecord::new("B"),
    ])
    .unwrap();
    let swapped = Family::from_records(&[
        PersonRecord::new("Kid").with_parents("B", "A").with_trait(true),
        PersonRecord::new("A").with_trait(true),
        PersonRecord::new("B"),
    ])
    .unwrap();

    let a = infer(&forward, &InferenceOptions::new()).unwrap();
    let b = infer(&swapped, &InferenceOptions::new()).unwrap();
    for (x, y) in a.people.iter().zip(&b.people) {
        for g in 0..3 {
            assert_relative_eq!(x.genotype[g], y.genotype[g], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_custom_mutation_rate_changes_child() {
    let family = Family::from_records(&[
        PersonRecord::new("Child").with_parents("Mum", "Dad"),
        PersonRecord::new("Mum"),
        PersonRecord::new("Dad"),
    ])
    .unwrap();
    let params = ModelParams::default().with_mutation_rate(0.0);
    let posteriors = infer(&family, &InferenceOptions::new().params(params)).unwrap();

    // Without mutation: 0.03*0.5 + 0.01*1.0 = 0.025 per parent.
    let child = posteriors.get("Child").unwrap();
    assert_relative_eq!(child.genotype[2], 0.025 * 0.025, epsilon = 1e-12);
}

#[test]
fn test_impossible_evidence_is_degenerate() {
    let params = ModelParams {
        trait_given_genotype: [0.0, 0.0, 0.0],
        ..ModelParams::default()
    };
    let family = Family::from_records(&[PersonRecord::new("X").with_trait(true)]).unwrap();
    let err = infer(&family, &InferenceOptions::new().params(params)).unwrap_err();
    assert!(matches!(err, HeredityError::DegenerateEvidence { index: 0 }), "Error was: {}", err);
}

#[test]
fn test_invalid_params_rejected_before_enumeration() {
    let params = ModelParams::default().with_mutation_rate(-0.1);
    let err = infer(&potter_family(), &InferenceOptions::new().params(params)).unwrap_err();
    assert!(matches!(err, HeredityError::InvalidParameter(_)));
}

#[test]
fn test_population_too_large() {
    let records: Vec<PersonRecord> = (0..33)
        .map(|i| PersonRecord::new(&format!("P{}", i)))
        .collect();
    let family = Family::from_records(&records).unwrap();
    let err = infer(&family, &InferenceOptions::new()).unwrap_err();
    assert!(matches!(err, HeredityError::PopulationTooLarge { size: 33, max: 32 }));
}

#[test]
fn test_empty_family() {
    let family = Family::from_records(&[]).unwrap();
    let posteriors = infer(&family, &InferenceOptions::new()).unwrap();
    assert!(posteriors.is_empty());
    assert_eq!(posteriors.stats.evaluations, 1);
}

#[test]
fn test_from_csv_end_to_end() {
    use std::io::Write;

    let path = std::env::temp_dir().join(format!("test_inference_{}.csv", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"name,mother,father,trait\nHarry,Lily,James,\nJames,,,1\nLily,,,0\n")
        .unwrap();
    drop(file);

    let family = Family::from_csv(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let posteriors = infer(&family, &InferenceOptions::new()).unwrap();
    let summary = posteriors.summary();
    assert!(summary.starts_with("Harry:\n  Gene:\n    2: 0.0092\n    1: 0.4557\n    0: 0.5351\n"));
    assert!(summary.contains("James:\n  Gene:\n    2: 0.1976\n    1: 0.5106\n    0: 0.2918\n"));
}
