use serde::{Deserialize, Serialize};

/// Separator joining component names into a configuration identity string.
pub const COMPONENT_SEPARATOR: &str = "_";

/// An ordered, non-empty subset of the base estimator-component set.
///
/// Configurations are produced once per run by the combinator, in increasing
/// subset-size order, and are never mutated after generation. The ordinal is
/// the 1-based position in combinator order and serves as the stable sort and
/// file-naming key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// 1-based position in combinator-generation order.
    pub ordinal: u64,
    /// Component names, order-preserving from the base set.
    pub components: Vec<String>,
}

impl Configuration {
    /// Returns the canonical identity string for the configuration.
    pub fn id(&self) -> String {
        self.components.join(COMPONENT_SEPARATOR)
    }
}

/// Point estimate of the treatment effect produced by one estimator trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEstimate {
    /// Point estimate of the average treatment effect.
    pub estimate: f64,
    /// Estimated sampling variance of the point estimate.
    pub variance: f64,
    /// Lower confidence bound.
    pub ci_lower: f64,
    /// Upper confidence bound.
    pub ci_upper: f64,
    /// Two-sided p-value against the null of zero effect.
    pub p_value: f64,
}

/// Outcome of one (configuration, seed) trial.
///
/// Always one of two explicit payload shapes; a failed trial carries the seed
/// and configuration identity so it can be diagnosed from the checkpoint
/// alone, never a structurally different object in the same slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TrialOutcome {
    /// The estimator returned a usable effect estimate.
    Success {
        /// Seed the trial was evaluated under.
        seed: u64,
        /// Point estimate of the treatment effect.
        estimate: f64,
        /// Estimated sampling variance.
        variance: f64,
        /// Lower confidence bound.
        ci_lower: f64,
        /// Upper confidence bound.
        ci_upper: f64,
        /// Two-sided p-value.
        p_value: f64,
        /// Wall time spent in the estimator, in seconds.
        elapsed_secs: f64,
    },
    /// The estimator failed or panicked for this seed.
    Failure {
        /// Seed the trial was evaluated under.
        seed: u64,
        /// Identity of the configuration being evaluated.
        config_id: String,
        /// Diagnostic message captured at the worker boundary.
        error: String,
        /// Wall time spent before the failure, in seconds.
        elapsed_secs: f64,
    },
}

impl TrialOutcome {
    /// Returns the seed the trial was evaluated under.
    pub fn seed(&self) -> u64 {
        match self {
            TrialOutcome::Success { seed, .. } | TrialOutcome::Failure { seed, .. } => *seed,
        }
    }

    /// Returns true when the trial carries an error marker.
    pub fn is_failure(&self) -> bool {
        matches!(self, TrialOutcome::Failure { .. })
    }
}

/// Read-only, column-oriented view over a working sample.
///
/// Workers share this view by reference; nothing behind it is mutated for the
/// lifetime of a run.
#[derive(Debug, Clone, Copy)]
pub struct SampleView<'a> {
    /// Observed outcome per record.
    pub outcome: &'a [f64],
    /// Binary treatment indicator per record.
    pub treatment: &'a [bool],
    /// Covariate columns, each of the same length as `outcome`.
    pub covariates: &'a [Vec<f64>],
}

impl SampleView<'_> {
    /// Number of records in the view.
    pub fn len(&self) -> usize {
        self.outcome.len()
    }

    /// Returns true when the view holds no records.
    pub fn is_empty(&self) -> bool {
        self.outcome.is_empty()
    }
}
