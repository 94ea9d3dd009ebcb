use std::fs;
use std::path::{Path, PathBuf};

use ace_core::errors::ErrorInfo;
use ace_core::{AceError, Configuration, TrialOutcome};
use serde::{Deserialize, Serialize};

/// Durable result set for one configuration.
///
/// The baseline estimate is a run-level constant computed once from the
/// working sample and attached identically to every checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// 1-based position of the configuration in combinator order.
    pub ordinal: u64,
    /// Canonical configuration identity.
    pub config_id: String,
    /// Component names of the configuration.
    pub components: Vec<String>,
    /// Unadjusted baseline effect estimate from the working sample.
    pub baseline_estimate: f64,
    /// One trial outcome per seed, in seed-plan order.
    pub results: Vec<TrialOutcome>,
}

impl Checkpoint {
    /// Restores a checkpoint from disk.
    pub fn load(path: &Path) -> Result<Self, AceError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("checkpoint-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("checkpoint-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Writes the checkpoint to disk through a temporary sibling so the
    /// durable name never holds a partial document.
    fn store(&self, path: &Path) -> Result<(), AceError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("checkpoint-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|err| {
            AceError::Checkpoint(
                ErrorInfo::new("checkpoint-write", err.to_string())
                    .with_context("path", staging.display().to_string()),
            )
        })?;
        fs::rename(&staging, path).map_err(|err| {
            AceError::Checkpoint(
                ErrorInfo::new("checkpoint-commit", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Deterministic checkpoint file name for a configuration.
///
/// The zero-padded ordinal prefix keeps directory listings in combinator
/// order; the identity suffix keeps names human-auditable.
pub fn checkpoint_file_name(ordinal: u64, config_id: &str) -> String {
    format!("{ordinal:04}_{config_id}.json")
}

/// Filesystem-backed store for per-configuration checkpoints.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
}

impl CheckpointStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the checkpoint files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Durable path for the given configuration.
    pub fn path_for(&self, config: &Configuration) -> PathBuf {
        self.root
            .join(checkpoint_file_name(config.ordinal, &config.id()))
    }

    /// Returns true when a checkpoint for the configuration already exists.
    /// Checked before the worker pool is invoked at all, so restarted runs
    /// skip expensive recomputation.
    pub fn exists(&self, config: &Configuration) -> bool {
        self.path_for(config).exists()
    }

    /// Durably persists one checkpoint, returning the written path.
    ///
    /// A failure here is fatal to the run; resumption correctness depends on
    /// checkpoint durability, so the caller must not retry silently.
    pub fn write(&self, checkpoint: &Checkpoint) -> Result<PathBuf, AceError> {
        fs::create_dir_all(&self.root).map_err(|err| {
            AceError::Checkpoint(
                ErrorInfo::new("checkpoint-mkdir", err.to_string())
                    .with_context("path", self.root.display().to_string()),
            )
        })?;
        let path = self
            .root
            .join(checkpoint_file_name(checkpoint.ordinal, &checkpoint.config_id));
        checkpoint.store(&path)?;
        Ok(path)
    }

    /// Reads every checkpoint under the store root, in no particular order.
    pub fn read_all(&self) -> Result<Vec<Checkpoint>, AceError> {
        let entries = fs::read_dir(&self.root).map_err(|err| {
            AceError::Serde(
                ErrorInfo::new("checkpoint-scan", err.to_string())
                    .with_context("path", self.root.display().to_string()),
            )
        })?;
        let mut checkpoints = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                AceError::Serde(
                    ErrorInfo::new("checkpoint-scan-entry", err.to_string())
                        .with_context("path", self.root.display().to_string()),
                )
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            checkpoints.push(Checkpoint::load(&path)?);
        }
        Ok(checkpoints)
    }
}

/// Assembles the checkpoint payload for a completed configuration sweep.
pub fn build_checkpoint(
    config: &Configuration,
    baseline_estimate: f64,
    results: Vec<TrialOutcome>,
) -> Checkpoint {
    Checkpoint {
        ordinal: config.ordinal,
        config_id: config.id(),
        components: config.components.clone(),
        baseline_estimate,
        results,
    }
}
