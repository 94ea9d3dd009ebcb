use std::path::PathBuf;
use std::thread;

use ace_core::errors::{AceError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::combinator;

/// YAML-configurable parameters governing a study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Base estimator component set (M names, order-preserving).
    #[serde(default = "default_components")]
    pub components: Vec<String>,
    /// Population generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Working sample size N.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Number of seeds K evaluated per configuration.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
    /// Upper bound (inclusive) for drawn seed values.
    #[serde(default = "default_seed_upper_bound")]
    pub seed_upper_bound: u64,
    /// Worker pool size C (0 selects available cores minus one).
    #[serde(default)]
    pub workers: usize,
    /// Master seed for every deterministic draw in the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Output directory layout.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_components() -> Vec<String> {
    ["trim", "winsor", "stabilize", "crossfit", "adjust"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_sample_size() -> usize {
    1000
}

fn default_seed_count() -> usize {
    100
}

fn default_seed_upper_bound() -> u64 {
    1_000_000
}

fn default_master_seed() -> u64 {
    0xACE5_EED0_0ACE_5EED_u64
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            components: default_components(),
            population: PopulationConfig::default(),
            sample_size: default_sample_size(),
            seed_count: default_seed_count(),
            seed_upper_bound: default_seed_upper_bound(),
            workers: 0,
            master_seed: default_master_seed(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Validates every run parameter, failing fast before any work starts.
    pub fn validate(&self) -> Result<(), AceError> {
        combinator::combination_count(self.components.len())?;
        for (idx, component) in self.components.iter().enumerate() {
            if component.is_empty() {
                return Err(AceError::Config(
                    ErrorInfo::new("component-name-empty", "component names must be non-empty")
                        .with_context("index", idx.to_string()),
                ));
            }
            if self.components[..idx].contains(component) {
                return Err(AceError::Config(
                    ErrorInfo::new("component-duplicate", "component names must be distinct")
                        .with_context("component", component.clone()),
                ));
            }
        }
        if self.seed_count < 1 {
            return Err(AceError::Config(ErrorInfo::new(
                "seed-count",
                "seed count must be at least 1",
            )));
        }
        if self.seed_count as u64 > self.seed_upper_bound {
            return Err(AceError::Config(
                ErrorInfo::new(
                    "seed-plan-range",
                    "seed count exceeds the seed upper bound",
                )
                .with_context("seed_count", self.seed_count.to_string())
                .with_context("upper_bound", self.seed_upper_bound.to_string()),
            ));
        }
        if self.sample_size < 1 || self.sample_size > self.population.size {
            return Err(AceError::Config(
                ErrorInfo::new(
                    "sample-size",
                    "sample size must lie in [1, population size]",
                )
                .with_context("sample_size", self.sample_size.to_string())
                .with_context("population", self.population.size.to_string()),
            ));
        }
        Ok(())
    }

    /// Resolves the effective worker count: the configured value, or
    /// available cores minus one when left at 0.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        thread::available_parallelism()
            .map(|cores| cores.get().saturating_sub(1).max(1))
            .unwrap_or(1)
    }
}

/// Synthetic population settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of records N0 in the reference population.
    #[serde(default = "default_population_size")]
    pub size: usize,
}

fn default_population_size() -> usize {
    20_000
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Created if it does not exist.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Subdirectory used for checkpoint files.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    /// Log filename relative to `run_directory`.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
    /// Consolidated table filename relative to `run_directory`.
    #[serde(default = "default_consolidated_file")]
    pub consolidated_file: PathBuf,
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("run_log.txt")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_consolidated_file() -> PathBuf {
    PathBuf::from("consolidated.csv")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            checkpoint_dir: default_checkpoint_dir(),
            log_file: default_log_file(),
            manifest_file: default_manifest_file(),
            consolidated_file: default_consolidated_file(),
        }
    }
}
