use std::collections::BTreeMap;
use std::fs;

use ace_estim::ResamplingEstimator;
use ace_sweep::{runner, stitcher, RunConfig, RunManifest};
use tempfile::tempdir;

fn study_config(out: &std::path::Path) -> RunConfig {
    let mut config = RunConfig::default();
    config.components = vec!["trim".into(), "winsor".into(), "adjust".into()];
    config.population.size = 400;
    config.sample_size = 50;
    config.seed_count = 5;
    config.workers = 2;
    config.master_seed = 31;
    config.output.run_directory = Some(out.to_path_buf());
    config
}

#[test]
fn full_study_produces_checkpoints_log_and_table() {
    let dir = tempdir().unwrap();
    let config = study_config(dir.path());
    let estimator = ResamplingEstimator::new();

    let report = runner::run(&config, &estimator).unwrap();
    assert_eq!(report.combinations, 7);
    assert_eq!(report.completed, 7);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.consolidated_rows, 35);
    assert_eq!(report.log_failures, 0);

    // Seven checkpoint files, named by ordinal and identity.
    let mut names: Vec<String> = fs::read_dir(dir.path().join("checkpoints"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "0001_trim.json");
    assert_eq!(names[6], "0007_trim_winsor_adjust.json");

    // The log carries one telemetry block per configuration.
    let log = fs::read_to_string(dir.path().join("run_log.txt")).unwrap();
    let blocks: Vec<&str> = log
        .split("\n\n")
        .filter(|block| block.contains("comb="))
        .collect();
    assert_eq!(blocks.len(), 7);
    for block in blocks {
        assert!(block.contains("finished comb="));
        assert!(block.contains("time:"));
        assert!(block.contains("usage: "));
    }
    assert!(log.contains("run started at "));
    assert!(log.contains("combinations: m=3 total=7"));
    assert!(log.contains("total time:"));

    // Consolidated table: header plus K rows per configuration, ordinals
    // 1..=7 each appearing exactly K times.
    let table = fs::read_to_string(dir.path().join("consolidated.csv")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 36);
    assert_eq!(
        lines[0],
        "ordinal,config,seed,estimate,variance,ci_lower,ci_upper,p_value,elapsed_secs"
    );
    let mut per_ordinal: BTreeMap<u64, usize> = BTreeMap::new();
    for line in &lines[1..] {
        let ordinal: u64 = line.split(',').next().unwrap().parse().unwrap();
        *per_ordinal.entry(ordinal).or_insert(0) += 1;
    }
    assert_eq!(per_ordinal.len(), 7);
    assert!(per_ordinal.values().all(|&count| count == 5));

    // Manifest records the expected combination space, and every checkpoint
    // carries the identical run-level baseline.
    let manifest = RunManifest::load(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(manifest.combination_count, 7);
    assert_eq!(manifest.checkpoints.len(), 7);
    let first_checkpoint =
        ace_sweep::Checkpoint::load(&dir.path().join("checkpoints/0001_trim.json")).unwrap();
    let last_checkpoint =
        ace_sweep::Checkpoint::load(&dir.path().join("checkpoints/0007_trim_winsor_adjust.json"))
            .unwrap();
    assert_eq!(first_checkpoint.baseline_estimate, manifest.baseline_estimate);
    assert_eq!(last_checkpoint.baseline_estimate, manifest.baseline_estimate);
}

#[test]
fn rerun_is_a_no_op_and_standalone_stitch_matches() {
    let dir = tempdir().unwrap();
    let config = study_config(dir.path());
    let estimator = ResamplingEstimator::new();

    let first = runner::run(&config, &estimator).unwrap();
    let second = runner::run(&config, &estimator).unwrap();
    assert_eq!(second.completed, 0);
    assert_eq!(second.skipped, 7);

    let rows = stitcher::stitch_run_dir(dir.path()).unwrap();
    assert_eq!(rows.len(), first.consolidated_rows);

    // Identical parameters reproduce identical estimates across runs.
    let other = tempdir().unwrap();
    let config_b = study_config(other.path());
    runner::run(&config_b, &estimator).unwrap();
    let rows_b = stitcher::stitch_run_dir(other.path()).unwrap();
    let estimates_a: Vec<Option<f64>> = rows.iter().map(|r| r.estimate).collect();
    let estimates_b: Vec<Option<f64>> = rows_b.iter().map(|r| r.estimate).collect();
    assert_eq!(estimates_a, estimates_b);
}
