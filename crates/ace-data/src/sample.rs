use ace_core::errors::{AceError, ErrorInfo};
use ace_core::{RngHandle, SampleView};
use rand::seq::index;

use crate::population::{ground_truth_of, GroundTruth, Population};

/// Deterministic subsample of the population, shared read-only by every
/// configuration and seed within a run.
#[derive(Debug, Clone)]
pub struct WorkingSample {
    covariates: Vec<Vec<f64>>,
    treatment: Vec<bool>,
    observed: Vec<f64>,
    y_treated: Vec<f64>,
    y_control: Vec<f64>,
}

impl WorkingSample {
    /// Draws `n` records from the population without replacement.
    ///
    /// Fully determined by `(population, n, seed)`; the same inputs always
    /// yield the same record set in the same order.
    pub fn draw(population: &Population, n: usize, seed: u64) -> Result<Self, AceError> {
        if n == 0 || n > population.len() {
            return Err(AceError::Data(
                ErrorInfo::new("sample-size", "sample size outside [1, population size]")
                    .with_context("n", n.to_string())
                    .with_context("population", population.len().to_string()),
            ));
        }
        let mut rng = RngHandle::from_seed(seed);
        let picks = index::sample(rng.inner_mut(), population.len(), n);

        let mut covariates = vec![Vec::with_capacity(n); population.covariates.len()];
        let mut treatment = Vec::with_capacity(n);
        let mut observed = Vec::with_capacity(n);
        let mut y_treated = Vec::with_capacity(n);
        let mut y_control = Vec::with_capacity(n);
        for row in picks.iter() {
            for (column, source) in covariates.iter_mut().zip(population.covariates.iter()) {
                column.push(source[row]);
            }
            treatment.push(population.treatment[row]);
            observed.push(population.observed[row]);
            y_treated.push(population.y_treated[row]);
            y_control.push(population.y_control[row]);
        }

        Ok(Self {
            covariates,
            treatment,
            observed,
            y_treated,
            y_control,
        })
    }

    /// Number of records in the sample.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Returns true when the sample holds no records.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Read-only view handed to estimator workers.
    pub fn view(&self) -> SampleView<'_> {
        SampleView {
            outcome: &self.observed,
            treatment: &self.treatment,
            covariates: &self.covariates,
        }
    }

    /// Ground-truth effects restricted to the drawn records.
    pub fn ground_truth(&self) -> GroundTruth {
        ground_truth_of(&self.y_treated, &self.y_control, &self.treatment)
    }

    /// Baseline point estimate: the unadjusted difference of observed arm
    /// means. Computed once per run and attached to every checkpoint.
    pub fn naive_effect(&self) -> Result<f64, AceError> {
        let mut treated_sum = 0.0;
        let mut treated_n = 0usize;
        let mut control_sum = 0.0;
        let mut control_n = 0usize;
        for (y, &t) in self.observed.iter().zip(self.treatment.iter()) {
            if t {
                treated_sum += y;
                treated_n += 1;
            } else {
                control_sum += y;
                control_n += 1;
            }
        }
        if treated_n == 0 || control_n == 0 {
            return Err(AceError::Data(
                ErrorInfo::new("sample-degenerate", "sample contains a single treatment arm")
                    .with_context("treated", treated_n.to_string())
                    .with_context("control", control_n.to_string())
                    .with_hint("increase the sample size"),
            ));
        }
        Ok(treated_sum / treated_n as f64 - control_sum / control_n as f64)
    }
}
