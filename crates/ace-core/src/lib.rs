#![deny(missing_docs)]
#![doc = "Core traits and data types for the ACE combinatorial simulation study."]

pub mod errors;
pub mod rng;
mod types;

pub use errors::{AceError, ErrorInfo};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{
    Configuration, EffectEstimate, SampleView, TrialOutcome, COMPONENT_SEPARATOR,
};

/// Contract for the opaque treatment-effect estimator.
///
/// The driver treats implementations as a black box: a pure function of the
/// working sample, the active configuration, and a trial seed. Implementations
/// must be deterministic for a fixed `(sample, config, seed)` triple and must
/// not retain mutable state across calls; the pool invokes `estimate` from
/// several worker threads concurrently against the same shared sample.
pub trait Estimator: Send + Sync {
    /// Evaluates one trial and returns the effect estimate, or an error when
    /// the estimator diverges or rejects the configuration.
    fn estimate(
        &self,
        sample: SampleView<'_>,
        config: &Configuration,
        seed: u64,
    ) -> Result<EffectEstimate, AceError>;
}
