use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use ace_core::errors::{AceError, ErrorInfo};
use ace_core::TrialOutcome;
use csv::WriterBuilder;

use crate::checkpoint::CheckpointStore;
use crate::manifest::RunManifest;

/// One consolidated row per (configuration, seed) pair.
///
/// Failed trials keep their row; the numeric estimate fields are absent and
/// rendered as `NA` in the CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRow {
    /// Combinator ordinal of the configuration.
    pub ordinal: u64,
    /// Canonical configuration identity.
    pub config_id: String,
    /// Trial seed.
    pub seed: u64,
    /// Point estimate, absent for failed trials.
    pub estimate: Option<f64>,
    /// Estimated variance, absent for failed trials.
    pub variance: Option<f64>,
    /// Lower confidence bound, absent for failed trials.
    pub ci_lower: Option<f64>,
    /// Upper confidence bound, absent for failed trials.
    pub ci_upper: Option<f64>,
    /// Two-sided p-value, absent for failed trials.
    pub p_value: Option<f64>,
    /// Wall time of the trial, in seconds.
    pub elapsed_secs: f64,
}

/// Reads every checkpoint and flattens them into one table sorted by ordinal
/// then seed-plan order.
///
/// The discovered ordinal set must match `1..=expected` exactly; otherwise a
/// completeness error listing the missing and unexpected ordinals is returned
/// instead of a silently partial table.
pub fn stitch(store: &CheckpointStore, expected: u64) -> Result<Vec<ConsolidatedRow>, AceError> {
    let mut by_ordinal = BTreeMap::new();
    for checkpoint in store.read_all()? {
        let ordinal = checkpoint.ordinal;
        if by_ordinal.insert(ordinal, checkpoint).is_some() {
            return Err(AceError::Stitch(
                ErrorInfo::new("duplicate-ordinal", "two checkpoints share one ordinal")
                    .with_context("ordinal", ordinal.to_string()),
            ));
        }
    }

    let missing: Vec<String> = (1..=expected)
        .filter(|ordinal| !by_ordinal.contains_key(ordinal))
        .map(|ordinal| ordinal.to_string())
        .collect();
    let unexpected: Vec<String> = by_ordinal
        .keys()
        .filter(|&&ordinal| ordinal < 1 || ordinal > expected)
        .map(|ordinal| ordinal.to_string())
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(AceError::Stitch(
            ErrorInfo::new(
                "incomplete-run",
                "checkpoint set does not match the expected ordinals",
            )
            .with_context("expected", expected.to_string())
            .with_context("missing", missing.join(","))
            .with_context("unexpected", unexpected.join(","))
            .with_hint("re-run the study to fill the gaps before consolidating"),
        ));
    }

    let mut rows = Vec::new();
    for (ordinal, checkpoint) in by_ordinal {
        for outcome in &checkpoint.results {
            rows.push(row_from_outcome(ordinal, &checkpoint.config_id, outcome));
        }
    }
    Ok(rows)
}

fn row_from_outcome(ordinal: u64, config_id: &str, outcome: &TrialOutcome) -> ConsolidatedRow {
    match outcome {
        TrialOutcome::Success {
            seed,
            estimate,
            variance,
            ci_lower,
            ci_upper,
            p_value,
            elapsed_secs,
        } => ConsolidatedRow {
            ordinal,
            config_id: config_id.to_string(),
            seed: *seed,
            estimate: Some(*estimate),
            variance: Some(*variance),
            ci_lower: Some(*ci_lower),
            ci_upper: Some(*ci_upper),
            p_value: Some(*p_value),
            elapsed_secs: *elapsed_secs,
        },
        TrialOutcome::Failure {
            seed, elapsed_secs, ..
        } => ConsolidatedRow {
            ordinal,
            config_id: config_id.to_string(),
            seed: *seed,
            estimate: None,
            variance: None,
            ci_lower: None,
            ci_upper: None,
            p_value: None,
            elapsed_secs: *elapsed_secs,
        },
    }
}

/// Writes the consolidated table as CSV with a header row.
pub fn write_csv(rows: &[ConsolidatedRow], path: &Path) -> Result<(), AceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| wrap_io("consolidated-mkdir", path, err))?;
    }
    let file = File::create(path).map_err(|err| wrap_io("consolidated-create", path, err))?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer
        .write_record([
            "ordinal",
            "config",
            "seed",
            "estimate",
            "variance",
            "ci_lower",
            "ci_upper",
            "p_value",
            "elapsed_secs",
        ])
        .map_err(|err| wrap_csv("consolidated-header", err))?;
    for row in rows {
        writer
            .write_record([
                row.ordinal.to_string(),
                row.config_id.clone(),
                row.seed.to_string(),
                render_field(row.estimate),
                render_field(row.variance),
                render_field(row.ci_lower),
                render_field(row.ci_upper),
                render_field(row.p_value),
                format!("{:.6}", row.elapsed_secs),
            ])
            .map_err(|err| wrap_csv("consolidated-row", err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("consolidated-flush", err.into()))?;
    Ok(())
}

fn render_field(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => "NA".to_string(),
    }
}

/// Consolidates an existing run directory standalone, recovering the expected
/// configuration space from the run manifest.
pub fn stitch_run_dir(run_dir: &Path) -> Result<Vec<ConsolidatedRow>, AceError> {
    let manifest = RunManifest::load(&run_dir.join("manifest.json"))?;
    let store = CheckpointStore::new(run_dir.join(&manifest.config.output.checkpoint_dir));
    stitch(&store, manifest.combination_count)
}

fn wrap_io(code: &str, path: &Path, err: std::io::Error) -> AceError {
    AceError::Stitch(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

fn wrap_csv(code: &str, err: csv::Error) -> AceError {
    AceError::Stitch(ErrorInfo::new(code, "CSV consolidation failure").with_hint(err.to_string()))
}
