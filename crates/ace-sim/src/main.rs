use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use ace_estim::ResamplingEstimator;
use ace_sweep::{runner, stitcher, RunConfig};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "ace-sim", about = "ACE combinatorial study driver CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a full study run from a configuration.
    Run(RunArgs),
    /// Consolidate an existing run directory into one table.
    Stitch(StitchArgs),
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// YAML configuration describing the study run.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for run artefacts.
    #[arg(long)]
    out: PathBuf,
    /// Working sample size N (overrides the configuration).
    #[arg(long)]
    sample_size: Option<usize>,
    /// Seed count K (overrides the configuration).
    #[arg(long)]
    seeds: Option<usize>,
    /// Worker pool size C (overrides the configuration).
    #[arg(long)]
    workers: Option<usize>,
    /// Master seed (overrides the configuration).
    #[arg(long)]
    master_seed: Option<u64>,
}

#[derive(ClapArgs, Debug)]
struct StitchArgs {
    /// Run directory holding the manifest and checkpoint files.
    #[arg(long)]
    run_dir: PathBuf,
    /// Destination CSV path (defaults to consolidated.csv in the run dir).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_command(args),
        Command::Stitch(args) => stitch_command(args),
    }
}

fn run_command(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path, &args.out)?,
        None => {
            let mut config = RunConfig::default();
            config.output.run_directory = Some(args.out.clone());
            config
        }
    };
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }
    if let Some(seeds) = args.seeds {
        config.seed_count = seeds;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(master_seed) = args.master_seed {
        config.master_seed = master_seed;
    }

    let report = runner::run(&config, &ResamplingEstimator::new())?;
    let summary = json!({
        "combinations": report.combinations,
        "completed": report.completed,
        "skipped": report.skipped,
        "trial_failures": report.trial_failures,
        "consolidated_rows": report.consolidated_rows,
        "consolidated": report.consolidated_path,
        "manifest": report.manifest_path,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn stitch_command(args: StitchArgs) -> Result<(), Box<dyn Error>> {
    let rows = stitcher::stitch_run_dir(&args.run_dir)?;
    let out = args
        .out
        .unwrap_or_else(|| args.run_dir.join("consolidated.csv"));
    stitcher::write_csv(&rows, &out)?;
    println!("stitched {} rows into {}", rows.len(), out.display());
    Ok(())
}

fn load_config(path: &Path, out_dir: &Path) -> Result<RunConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let mut config: RunConfig = serde_yaml::from_str(&contents)?;
    config.output.run_directory = Some(out_dir.to_path_buf());
    if config.output.checkpoint_dir.as_os_str().is_empty() {
        config.output.checkpoint_dir = PathBuf::from("checkpoints");
    }
    Ok(config)
}
