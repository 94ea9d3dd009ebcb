#![deny(missing_docs)]
#![doc = "Synthetic data generation for the ACE simulation study: the reference population and the per-run working sample."]

mod population;
mod sample;

pub use population::{sample_population, GroundTruth, Population, NUM_COVARIATES};
pub use sample::WorkingSample;
