use ace_core::errors::ErrorInfo;
use ace_core::{AceError, Configuration, EffectEstimate, Estimator, SampleView, TrialOutcome};
use ace_data::{sample_population, WorkingSample};
use ace_sweep::run_sweep;

fn fixture() -> WorkingSample {
    let population = sample_population(300, 5).unwrap();
    WorkingSample::draw(&population, 60, 5).unwrap()
}

fn config() -> Configuration {
    Configuration {
        ordinal: 1,
        components: vec!["trim".into()],
    }
}

/// Succeeds everywhere except one seed, where it returns an error.
struct FlakyEstimator {
    fail_seed: u64,
}

impl Estimator for FlakyEstimator {
    fn estimate(
        &self,
        _sample: SampleView<'_>,
        _config: &Configuration,
        seed: u64,
    ) -> Result<EffectEstimate, AceError> {
        if seed == self.fail_seed {
            return Err(AceError::Estimator(ErrorInfo::new(
                "diverged",
                "synthetic divergence",
            )));
        }
        Ok(EffectEstimate {
            estimate: seed as f64,
            variance: 1.0,
            ci_lower: seed as f64 - 1.96,
            ci_upper: seed as f64 + 1.96,
            p_value: 0.5,
        })
    }
}

/// Panics on one seed instead of returning an error.
struct PanickyEstimator {
    panic_seed: u64,
}

impl Estimator for PanickyEstimator {
    fn estimate(
        &self,
        _sample: SampleView<'_>,
        _config: &Configuration,
        seed: u64,
    ) -> Result<EffectEstimate, AceError> {
        if seed == self.panic_seed {
            panic!("estimator blew up on seed {seed}");
        }
        Ok(EffectEstimate {
            estimate: 0.0,
            variance: 1.0,
            ci_lower: -1.96,
            ci_upper: 1.96,
            p_value: 1.0,
        })
    }
}

#[test]
fn one_failure_does_not_abort_the_sweep() {
    let sample = fixture();
    let seeds = [11u64, 22, 33, 44, 55];
    let estimator = FlakyEstimator { fail_seed: 33 };

    let results = run_sweep(&estimator, &sample, &config(), &seeds, 2).unwrap();
    assert_eq!(results.len(), seeds.len());

    for (result, &seed) in results.iter().zip(seeds.iter()) {
        assert_eq!(result.seed(), seed);
        if seed == 33 {
            assert!(result.is_failure());
            match result {
                TrialOutcome::Failure {
                    config_id, error, ..
                } => {
                    assert_eq!(config_id, "trim");
                    assert!(error.contains("diverged"));
                }
                TrialOutcome::Success { .. } => unreachable!(),
            }
        } else {
            assert!(!result.is_failure());
        }
    }
}

#[test]
fn results_follow_seed_plan_order() {
    let sample = fixture();
    let seeds = [9u64, 1, 7, 3, 5, 2, 8];
    let estimator = FlakyEstimator { fail_seed: u64::MAX };

    let results = run_sweep(&estimator, &sample, &config(), &seeds, 4).unwrap();
    let returned: Vec<u64> = results.iter().map(|r| r.seed()).collect();
    assert_eq!(returned, seeds);
}

#[test]
fn a_panicking_estimator_is_contained() {
    let sample = fixture();
    let seeds = [1u64, 2, 3];
    let estimator = PanickyEstimator { panic_seed: 2 };

    let results = run_sweep(&estimator, &sample, &config(), &seeds, 2).unwrap();
    assert_eq!(results.len(), 3);
    assert!(!results[0].is_failure());
    assert!(!results[2].is_failure());
    match &results[1] {
        TrialOutcome::Failure { error, .. } => {
            assert!(error.contains("panicked"));
            assert!(error.contains("blew up"));
        }
        TrialOutcome::Success { .. } => panic!("panic was not converted to a failure marker"),
    }
}
