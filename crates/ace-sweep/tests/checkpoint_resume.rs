use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ace_core::{AceError, Configuration, EffectEstimate, Estimator, SampleView, TrialOutcome};
use ace_sweep::{build_checkpoint, runner, Checkpoint, CheckpointStore, RunConfig};
use tempfile::tempdir;

/// Counts every estimator invocation across the run.
#[derive(Clone)]
struct CountingEstimator {
    calls: Arc<AtomicUsize>,
}

impl Estimator for CountingEstimator {
    fn estimate(
        &self,
        _sample: SampleView<'_>,
        _config: &Configuration,
        seed: u64,
    ) -> Result<EffectEstimate, AceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EffectEstimate {
            estimate: seed as f64 * 0.01,
            variance: 1.0,
            ci_lower: 0.0,
            ci_upper: 1.0,
            p_value: 0.5,
        })
    }
}

fn small_config(out: &std::path::Path) -> RunConfig {
    let mut config = RunConfig::default();
    config.components = vec!["a".into(), "b".into(), "c".into()];
    config.population.size = 300;
    config.sample_size = 40;
    config.seed_count = 4;
    config.workers = 2;
    config.master_seed = 404;
    config.output.run_directory = Some(out.to_path_buf());
    config
}

#[test]
fn store_roundtrips_one_checkpoint() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoints"));
    let configuration = Configuration {
        ordinal: 3,
        components: vec!["a".into(), "b".into()],
    };
    let checkpoint = build_checkpoint(
        &configuration,
        1.5,
        vec![TrialOutcome::Failure {
            seed: 8,
            config_id: "a_b".into(),
            error: "x".into(),
            elapsed_secs: 0.0,
        }],
    );

    assert!(!store.exists(&configuration));
    let path = store.write(&checkpoint).unwrap();
    assert!(store.exists(&configuration));
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), "0003_a_b.json");

    let restored = Checkpoint::load(&path).unwrap();
    assert_eq!(restored, checkpoint);

    let all = store.read_all().unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn second_run_skips_every_checkpointed_configuration() {
    let dir = tempdir().unwrap();
    let config = small_config(dir.path());
    let calls = Arc::new(AtomicUsize::new(0));
    let estimator = CountingEstimator {
        calls: Arc::clone(&calls),
    };

    let first = runner::run(&config, &estimator).unwrap();
    assert_eq!(first.combinations, 7);
    assert_eq!(first.completed, 7);
    assert_eq!(first.skipped, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 7 * 4);

    let second = runner::run(&config, &estimator).unwrap();
    assert_eq!(second.completed, 0);
    assert_eq!(second.skipped, 7);
    // The resume property: zero evaluations on the second pass.
    assert_eq!(calls.load(Ordering::SeqCst), 7 * 4);
}

#[test]
fn interrupted_run_recomputes_only_the_gap() {
    let dir = tempdir().unwrap();
    let config = small_config(dir.path());
    let calls = Arc::new(AtomicUsize::new(0));
    let estimator = CountingEstimator {
        calls: Arc::clone(&calls),
    };

    runner::run(&config, &estimator).unwrap();
    let baseline_calls = calls.load(Ordering::SeqCst);

    // Simulate a run killed before configuration 5 was persisted.
    let checkpoint_dir = dir.path().join("checkpoints");
    let victim = checkpoint_dir.join("0005_a_c.json");
    assert!(victim.exists());
    std::fs::remove_file(&victim).unwrap();

    let resumed = runner::run(&config, &estimator).unwrap();
    assert_eq!(resumed.completed, 1);
    assert_eq!(resumed.skipped, 6);
    assert_eq!(calls.load(Ordering::SeqCst), baseline_calls + 4);
    assert!(victim.exists());
}
