use ace_core::errors::{AceError, ErrorInfo};
use ace_core::RngHandle;
use rand::seq::index;

use crate::determinism;

/// Draws the ordered seed plan for a run.
///
/// Returns `count` distinct integers in `[1, upper_bound]`, fully determined
/// by `(master_seed, count, upper_bound)`. Every configuration in a run is
/// evaluated against this exact sequence, which is what makes paired
/// comparison across configurations valid.
pub fn seed_plan(master_seed: u64, count: usize, upper_bound: u64) -> Result<Vec<u64>, AceError> {
    if count < 1 {
        return Err(AceError::Config(ErrorInfo::new(
            "seed-count",
            "seed count must be at least 1",
        )));
    }
    if count as u64 > upper_bound {
        return Err(AceError::Config(
            ErrorInfo::new(
                "seed-plan-range",
                "cannot draw more distinct seeds than the upper bound allows",
            )
            .with_context("count", count.to_string())
            .with_context("upper_bound", upper_bound.to_string()),
        ));
    }
    if upper_bound > usize::MAX as u64 {
        return Err(AceError::Config(
            ErrorInfo::new("seed-upper-bound", "seed upper bound too large for this platform")
                .with_context("upper_bound", upper_bound.to_string()),
        ));
    }
    let mut rng = RngHandle::from_seed(determinism::seed_plan_seed(master_seed));
    let picks = index::sample(rng.inner_mut(), upper_bound as usize, count);
    Ok(picks.iter().map(|i| i as u64 + 1).collect())
}
