use std::fs;
use std::path::{Path, PathBuf};

use ace_core::errors::ErrorInfo;
use ace_core::AceError;
use ace_data::GroundTruth;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;

/// Structured manifest describing a completed study run.
///
/// Written once at the end of a run; the standalone stitcher reads it back to
/// recover the expected configuration space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// ISO-8601 timestamp recording when the manifest was written.
    pub created_at: String,
    /// Full configuration used for the run.
    pub config: RunConfig,
    /// Stable hash of the run configuration.
    pub config_hash: String,
    /// Ground-truth effect values of the population.
    pub ground_truth: GroundTruth,
    /// Run-level baseline effect estimate from the working sample.
    pub baseline_estimate: f64,
    /// Expected number of checkpoints (2^M - 1).
    pub combination_count: u64,
    /// Checkpoint files relative to the run directory, in combinator order.
    pub checkpoints: Vec<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), AceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                AceError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, AceError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
