use ace_core::errors::{AceError, ErrorInfo};
use ace_core::RngHandle;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Number of covariate columns generated for every record.
pub const NUM_COVARIATES: usize = 4;

/// Ground-truth effect values carried alongside a synthetic population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    /// Sample average treatment effect: mean of `y1 - y0` over all records.
    pub sate: f64,
    /// Average treatment effect on the treated records.
    pub att: f64,
}

/// Immutable synthetic reference population.
///
/// Each record carries covariates, a binary treatment indicator, the observed
/// outcome, and both latent counterfactual outcomes. Created once per run and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct Population {
    pub(crate) covariates: Vec<Vec<f64>>,
    pub(crate) treatment: Vec<bool>,
    pub(crate) observed: Vec<f64>,
    pub(crate) y_treated: Vec<f64>,
    pub(crate) y_control: Vec<f64>,
}

impl Population {
    /// Number of records in the population.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Returns true when the population holds no records.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Computes ground-truth effect values from the latent counterfactuals.
    pub fn ground_truth(&self) -> GroundTruth {
        ground_truth_of(&self.y_treated, &self.y_control, &self.treatment)
    }
}

pub(crate) fn ground_truth_of(
    y_treated: &[f64],
    y_control: &[f64],
    treatment: &[bool],
) -> GroundTruth {
    let n = y_treated.len();
    let mut sate_sum = 0.0;
    let mut att_sum = 0.0;
    let mut treated = 0usize;
    for i in 0..n {
        let delta = y_treated[i] - y_control[i];
        sate_sum += delta;
        if treatment[i] {
            att_sum += delta;
            treated += 1;
        }
    }
    let sate = sate_sum / n as f64;
    let att = if treated > 0 {
        att_sum / treated as f64
    } else {
        sate
    };
    GroundTruth { sate, att }
}

/// Draws a synthetic population of the requested size.
///
/// The generating process is fixed: standard-normal covariates, a logistic
/// propensity over the first three covariates, a linear control surface and a
/// heterogeneous additive effect. Fully determined by `(size, seed)`.
pub fn sample_population(size: usize, seed: u64) -> Result<Population, AceError> {
    if size == 0 {
        return Err(AceError::Data(
            ErrorInfo::new("population-empty", "population size must be at least 1")
                .with_context("size", size.to_string()),
        ));
    }
    let mut rng = RngHandle::from_seed(seed);
    let mut covariates = vec![Vec::with_capacity(size); NUM_COVARIATES];
    let mut treatment = Vec::with_capacity(size);
    let mut observed = Vec::with_capacity(size);
    let mut y_treated = Vec::with_capacity(size);
    let mut y_control = Vec::with_capacity(size);

    for _ in 0..size {
        let mut x = [0.0f64; NUM_COVARIATES];
        for value in x.iter_mut() {
            *value = rng.inner_mut().sample(StandardNormal);
        }
        let score = 0.4 * x[0] - 0.3 * x[1] + 0.2 * x[2];
        let propensity = 1.0 / (1.0 + (-score).exp());
        let treated = rng.inner_mut().gen::<f64>() < propensity;

        let noise: f64 = rng.inner_mut().sample(StandardNormal);
        let y0 = 1.0 + 0.8 * x[0] + 0.5 * x[1] + noise;
        let tau = 2.0 + 0.5 * x[2] + 0.25 * x[3];
        let y1 = y0 + tau;

        for (column, value) in covariates.iter_mut().zip(x.iter()) {
            column.push(*value);
        }
        treatment.push(treated);
        observed.push(if treated { y1 } else { y0 });
        y_treated.push(y1);
        y_control.push(y0);
    }

    Ok(Population {
        covariates,
        treatment,
        observed,
        y_treated,
        y_control,
    })
}
