use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use ace_data::GroundTruth;
use chrono::Utc;

/// Append-only, line-oriented run log.
///
/// The log is read by an external telemetry extractor while the run is still
/// in progress: every line is flushed immediately, and each completed
/// configuration emits a fixed three-line block (`comb=`, `time:`, `usage:`)
/// terminated by a blank line. That layout is a compatibility contract; do
/// not reorder the lines.
///
/// Logging never aborts computation: write failures are reported on stderr
/// and counted, and the sink degrades to a no-op when the file cannot be
/// opened at all.
#[derive(Debug)]
pub struct RunLogger {
    sink: Option<File>,
    failures: usize,
}

impl RunLogger {
    /// Opens the log for appending, creating parent directories as needed.
    pub fn open(path: &Path) -> Self {
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("run log directory unavailable: {err}");
                return Self {
                    sink: None,
                    failures: 1,
                };
            }
        }
        match OpenOptions::new().append(true).create(true).open(path) {
            Ok(file) => Self {
                sink: Some(file),
                failures: 0,
            },
            Err(err) => {
                eprintln!("run log unavailable at {}: {err}", path.display());
                Self {
                    sink: None,
                    failures: 1,
                }
            }
        }
    }

    /// Number of log lines that could not be written.
    pub fn failures(&self) -> usize {
        self.failures
    }

    fn line(&mut self, text: &str) {
        let Some(file) = self.sink.as_mut() else {
            self.failures += 1;
            return;
        };
        let outcome = writeln!(file, "{text}").and_then(|()| file.flush());
        if let Err(err) = outcome {
            eprintln!("run log write failed: {err}");
            self.failures += 1;
        }
    }

    fn blank(&mut self) {
        self.line("");
    }

    /// Run preamble: start timestamp and the full parameter set.
    pub fn run_started(&mut self, params: SessionParams) {
        self.line(&format!("run started at {}", Utc::now().to_rfc3339()));
        self.line(&format!(
            "parameters: master_seed={} n={} k={} workers={}",
            params.master_seed, params.n, params.k, params.workers
        ));
        self.blank();
    }

    /// Population and working-sample summary, including ground truth.
    pub fn population_summary(
        &mut self,
        records: usize,
        truth: &GroundTruth,
        n: usize,
        baseline: f64,
    ) {
        self.line(&format!(
            "population: records={records} sate={:.6} att={:.6}",
            truth.sate, truth.att
        ));
        self.line(&format!("sample: n={n} baseline={baseline:.6}"));
        self.blank();
    }

    /// Combinator summary: base set size and total combination count.
    pub fn combinator_summary(&mut self, m: usize, total: u64) {
        self.line(&format!("combinations: m={m} total={total}"));
        self.blank();
    }

    /// Resume notice for a configuration whose checkpoint already exists.
    /// Deliberately avoids the `comb=` pattern so the telemetry extractor
    /// only sees blocks for configurations computed in this session.
    pub fn checkpoint_skipped(&mut self, ordinal: u64, config_id: &str) {
        self.line(&format!(
            "resume: checkpoint present for ordinal {ordinal} id={config_id}"
        ));
        self.blank();
    }

    /// Telemetry block emitted when a configuration completes.
    pub fn combination_finished(
        &mut self,
        ordinal: u64,
        total: u64,
        config_id: &str,
        trial_errors: usize,
        elapsed_secs: f64,
    ) {
        self.line(&format!(
            "finished comb={ordinal} of {total} id={config_id} trial_errors={trial_errors}"
        ));
        self.line(&format!("time:{elapsed_secs:.3}"));
        self.line(&usage_line());
        self.blank();
    }

    /// Fatal-error notice emitted just before the run aborts.
    pub fn error(&mut self, message: &str) {
        self.line(&format!("error: {message}"));
        self.blank();
    }

    /// Run epilogue: session summary and total elapsed time.
    pub fn run_finished(
        &mut self,
        completed: u64,
        skipped: u64,
        trial_errors: u64,
        params: SessionParams,
        elapsed_secs: f64,
    ) {
        self.line(&format!(
            "run finished at {}: completed={completed} skipped={skipped} trial_errors={trial_errors}",
            Utc::now().to_rfc3339()
        ));
        self.line(&format!(
            "session: os={} arch={} master_seed={} n={} k={} workers={}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            params.master_seed,
            params.n,
            params.k,
            params.workers
        ));
        self.line(&format!("total time:{elapsed_secs:.3}"));
    }
}

/// Run parameters echoed in the log for reproducibility.
#[derive(Debug, Clone, Copy)]
pub struct SessionParams {
    /// Master seed for the run.
    pub master_seed: u64,
    /// Working sample size N.
    pub n: usize,
    /// Seed count K.
    pub k: usize,
    /// Effective worker count C.
    pub workers: usize,
}

fn usage_line() -> String {
    match current_rss_mib() {
        Some(rss) => format!("usage: rss={rss:.1} MiB"),
        None => "usage: unavailable".to_string(),
    }
}

/// Resident set size in MiB, read from `/proc/self/status`.
fn current_rss_mib() -> Option<f64> {
    let contents = fs::read_to_string("/proc/self/status").ok()?;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kib: f64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kib / 1024.0);
        }
    }
    None
}
