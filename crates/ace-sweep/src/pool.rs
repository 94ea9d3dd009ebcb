use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use ace_core::errors::{AceError, ErrorInfo};
use ace_core::{Configuration, Estimator, TrialOutcome};
use ace_data::WorkingSample;
use rayon::prelude::*;

/// Evaluates one configuration against the full seed plan on a bounded pool.
///
/// Exactly one [`TrialOutcome`] is produced per seed, in seed-plan order
/// regardless of completion order. A failing or panicking estimator poisons
/// only its own slot; the pool always runs every seed to completion and never
/// short-circuits.
pub fn run_sweep(
    estimator: &dyn Estimator,
    sample: &WorkingSample,
    config: &Configuration,
    seeds: &[u64],
    workers: usize,
) -> Result<Vec<TrialOutcome>, AceError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|err| {
            AceError::Config(
                ErrorInfo::new("thread-pool", "failed to build worker pool")
                    .with_context("workers", workers.to_string())
                    .with_hint(err.to_string()),
            )
        })?;

    let mut indexed: Vec<(usize, TrialOutcome)> = pool.install(|| {
        seeds
            .par_iter()
            .enumerate()
            .map(|(index, &seed)| (index, evaluate_trial(estimator, sample, config, seed)))
            .collect()
    });
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, outcome)| outcome).collect())
}

fn evaluate_trial(
    estimator: &dyn Estimator,
    sample: &WorkingSample,
    config: &Configuration,
    seed: u64,
) -> TrialOutcome {
    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| {
        estimator.estimate(sample.view(), config, seed)
    }));
    let elapsed_secs = started.elapsed().as_secs_f64();
    match result {
        Ok(Ok(effect)) => TrialOutcome::Success {
            seed,
            estimate: effect.estimate,
            variance: effect.variance,
            ci_lower: effect.ci_lower,
            ci_upper: effect.ci_upper,
            p_value: effect.p_value,
            elapsed_secs,
        },
        Ok(Err(err)) => TrialOutcome::Failure {
            seed,
            config_id: config.id(),
            error: err.to_string(),
            elapsed_secs,
        },
        Err(panic) => {
            let message = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            TrialOutcome::Failure {
                seed,
                config_id: config.id(),
                error: format!("estimator panicked: {message}"),
                elapsed_secs,
            }
        }
    }
}
