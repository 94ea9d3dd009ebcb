#![deny(missing_docs)]
#![doc = "Reference treatment-effect estimator for the ACE study. The driver only sees the `Estimator` trait; this crate provides the implementation used by the CLI and the integration tests."]

mod estimator;

pub use estimator::{ResamplingEstimator, KNOWN_COMPONENTS};
