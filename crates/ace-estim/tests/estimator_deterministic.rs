use ace_core::{Configuration, Estimator};
use ace_data::{sample_population, WorkingSample};
use ace_estim::ResamplingEstimator;

fn fixture() -> WorkingSample {
    let population = sample_population(2000, 31).unwrap();
    WorkingSample::draw(&population, 400, 77).unwrap()
}

fn config(ordinal: u64, components: &[&str]) -> Configuration {
    Configuration {
        ordinal,
        components: components.iter().map(|c| c.to_string()).collect(),
    }
}

#[test]
fn same_seed_yields_identical_estimate() {
    let sample = fixture();
    let estimator = ResamplingEstimator::new();
    let cfg = config(1, &["trim"]);

    let a = estimator.estimate(sample.view(), &cfg, 42).unwrap();
    let b = estimator.estimate(sample.view(), &cfg, 42).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_resample_differently() {
    let sample = fixture();
    let estimator = ResamplingEstimator::new();
    let cfg = config(1, &["winsor"]);

    let a = estimator.estimate(sample.view(), &cfg, 1).unwrap();
    let b = estimator.estimate(sample.view(), &cfg, 2).unwrap();
    assert_ne!(a.estimate, b.estimate);
}

#[test]
fn components_change_the_estimate() {
    let sample = fixture();
    let estimator = ResamplingEstimator::new();

    let plain = estimator
        .estimate(sample.view(), &config(1, &["winsor"]), 9)
        .unwrap();
    let adjusted = estimator
        .estimate(sample.view(), &config(2, &["winsor", "adjust"]), 9)
        .unwrap();
    assert_ne!(plain.estimate, adjusted.estimate);
}

#[test]
fn estimate_is_coherent() {
    let sample = fixture();
    let estimator = ResamplingEstimator::new();
    let result = estimator
        .estimate(sample.view(), &config(1, &["stabilize", "crossfit"]), 5)
        .unwrap();

    assert!(result.ci_lower <= result.estimate);
    assert!(result.estimate <= result.ci_upper);
    assert!(result.variance >= 0.0);
    assert!((0.0..=1.0).contains(&result.p_value));
}

#[test]
fn unknown_component_is_rejected_per_trial() {
    let sample = fixture();
    let estimator = ResamplingEstimator::new();
    let err = estimator
        .estimate(sample.view(), &config(1, &["bogus"]), 5)
        .unwrap_err();
    assert_eq!(err.info().code, "unknown-component");
}
