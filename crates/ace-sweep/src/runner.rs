use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use ace_core::errors::ErrorInfo;
use ace_core::{AceError, Estimator};
use ace_data::{sample_population, WorkingSample};
use chrono::Utc;

use crate::checkpoint::{build_checkpoint, checkpoint_file_name, CheckpointStore};
use crate::combinator::configurations;
use crate::config::RunConfig;
use crate::determinism;
use crate::hash::stable_hash_string;
use crate::logger::{RunLogger, SessionParams};
use crate::manifest::RunManifest;
use crate::pool::run_sweep;
use crate::seedplan::seed_plan;
use crate::stitcher::{stitch, write_csv};

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Total number of configurations in the study.
    pub combinations: u64,
    /// Configurations evaluated in this session.
    pub completed: u64,
    /// Configurations skipped because a checkpoint already existed.
    pub skipped: u64,
    /// Trials across all configurations that ended with an error marker.
    pub trial_failures: u64,
    /// Rows in the consolidated table.
    pub consolidated_rows: usize,
    /// Path of the written manifest.
    pub manifest_path: PathBuf,
    /// Path of the written consolidated table.
    pub consolidated_path: PathBuf,
    /// Log lines that could not be written.
    pub log_failures: usize,
}

/// Executes a full study under the configured output directory.
///
/// Side effects: one checkpoint per configuration under the checkpoint
/// subdirectory, the append-only run log, the run manifest, and the
/// consolidated CSV. A restarted run skips configurations whose checkpoints
/// already exist and recomputes only the rest.
pub fn run(config: &RunConfig, estimator: &dyn Estimator) -> Result<RunReport, AceError> {
    config.validate()?;
    let out = config.output.run_directory.clone().ok_or_else(|| {
        AceError::Config(ErrorInfo::new(
            "run-directory",
            "output.run_directory must be set before running",
        ))
    })?;
    fs::create_dir_all(&out).map_err(|err| {
        AceError::Checkpoint(
            ErrorInfo::new("run-dir-create", err.to_string())
                .with_context("path", out.display().to_string()),
        )
    })?;

    let started = Instant::now();
    let mut logger = RunLogger::open(&out.join(&config.output.log_file));
    let workers = config.effective_workers();

    let population = sample_population(
        config.population.size,
        determinism::population_seed(config.master_seed),
    )?;
    let truth = population.ground_truth();
    let sample = WorkingSample::draw(
        &population,
        config.sample_size,
        determinism::sample_seed(config.master_seed, config.sample_size),
    )?;
    let baseline = sample.naive_effect()?;
    let seeds = seed_plan(config.master_seed, config.seed_count, config.seed_upper_bound)?;

    let session = SessionParams {
        master_seed: config.master_seed,
        n: config.sample_size,
        k: config.seed_count,
        workers,
    };
    logger.run_started(session);
    logger.population_summary(population.len(), &truth, sample.len(), baseline);

    let sequence = configurations(&config.components)?;
    let total = sequence.total();
    logger.combinator_summary(config.components.len(), total);

    let store = CheckpointStore::new(out.join(&config.output.checkpoint_dir));
    let mut completed = 0u64;
    let mut skipped = 0u64;
    let mut trial_failures = 0u64;
    let mut checkpoint_paths = Vec::with_capacity(total as usize);

    for configuration in sequence {
        let config_id = configuration.id();
        checkpoint_paths.push(
            config
                .output
                .checkpoint_dir
                .join(checkpoint_file_name(configuration.ordinal, &config_id)),
        );
        if store.exists(&configuration) {
            skipped += 1;
            logger.checkpoint_skipped(configuration.ordinal, &config_id);
            continue;
        }

        let results = run_sweep(estimator, &sample, &configuration, &seeds, workers)?;
        let errors_here = results.iter().filter(|r| r.is_failure()).count();
        trial_failures += errors_here as u64;

        let checkpoint = build_checkpoint(&configuration, baseline, results);
        if let Err(err) = store.write(&checkpoint) {
            logger.error(&err.to_string());
            return Err(err);
        }
        completed += 1;
        logger.combination_finished(
            configuration.ordinal,
            total,
            &config_id,
            errors_here,
            started.elapsed().as_secs_f64(),
        );
    }

    let manifest = RunManifest {
        created_at: Utc::now().to_rfc3339(),
        config: config.clone(),
        config_hash: stable_hash_string(config)?,
        ground_truth: truth,
        baseline_estimate: baseline,
        combination_count: total,
        checkpoints: checkpoint_paths,
    };
    let manifest_path = out.join(&config.output.manifest_file);
    manifest.write(&manifest_path)?;

    let rows = stitch(&store, total)?;
    let consolidated_path = out.join(&config.output.consolidated_file);
    write_csv(&rows, &consolidated_path)?;

    logger.run_finished(
        completed,
        skipped,
        trial_failures,
        session,
        started.elapsed().as_secs_f64(),
    );

    Ok(RunReport {
        combinations: total,
        completed,
        skipped,
        trial_failures,
        consolidated_rows: rows.len(),
        manifest_path,
        consolidated_path,
        log_failures: logger.failures(),
    })
}
