//! HawkSight data-governance command-line tool.
//!
//! This binary profiles tabular files, detects drift against a stored
//! baseline, screens for exposed PII, writes deduplicated copies, and
//! persists a governance report per file.
//!
//! # Privacy Guarantees
//! - Input files are never modified
//! - Reports and logs carry masked PII previews only
//! - No network access

mod config;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use hawksight_core::governance::{compliance, drift, profiler, repair};
use hawksight_core::{
    BaselineStore, GovernanceConfig, GovernancePipeline, JsonBaselineStore, Profile, RunContext,
    init_logging, initialize_report_validator,
};
use tracing::{error, info};

use crate::config::{OverrideArgs, apply_overrides, load_config};
use crate::output::emit_json;

#[derive(Parser, Debug)]
#[command(name = "hawksight")]
#[command(about = "Data-governance pipeline for tabular files")]
#[command(version)]
#[command(long_about = "
HawkSight - data governance for delimited files

Each run profiles the file, compares it against a baseline profile, screens
text columns for unmasked PII, writes a deduplicated copy, and saves a JSON
governance report describing all of it.

EXAMPLES:
  hawksight baseline customers.csv --out baselines/customers.json
  hawksight run customers.csv --baseline baselines/customers.json
  hawksight scan customers.csv -o issues.json
  hawksight run data/*.csv --reports-dir audit/
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all five stages and persist a report per file
    Run(RunArgs),
    /// Print the profile of a file
    Profile(FileArgs),
    /// Print drift and anomaly findings for a file
    Detect(DetectArgs),
    /// Print unmasked PII findings for a file
    Scan(FileArgs),
    /// Write a deduplicated copy of a file
    Repair(RepairArgs),
    /// Profile a file and store the result as a baseline
    Baseline(BaselineArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input files
    #[arg(required = true, help = "Delimited files to govern")]
    pub files: Vec<PathBuf>,

    /// Baseline profile for drift detection
    #[arg(long, help = "Baseline profile JSON used as the drift reference")]
    pub baseline: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Input file
    #[arg(help = "Delimited file to read")]
    pub file: PathBuf,

    /// Output file path
    #[arg(short, long, help = "Write JSON here instead of stdout")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub file: FileArgs,

    /// Baseline profile for drift detection
    #[arg(long, help = "Baseline profile JSON used as the drift reference")]
    pub baseline: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Input file
    #[arg(help = "Delimited file to repair")]
    pub file: PathBuf,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Input file
    #[arg(help = "Delimited file to profile")]
    pub file: PathBuf,

    /// Baseline output path
    #[arg(long, help = "Where to store the baseline profile")]
    pub out: PathBuf,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// JSON log events
    #[arg(long, global = true, help = "Emit log events as JSON lines")]
    pub log_json: bool,

    /// Configuration file
    #[arg(
        long,
        global = true,
        env = "HAWKSIGHT_CONFIG",
        help = "JSON configuration file; flags override its settings"
    )]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_json) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    initialize_report_validator().context("Failed to initialize report validator")?;
    let base = load_config(cli.global.config.as_deref()).await?;

    match cli.command {
        Command::Run(args) => {
            let config = apply_overrides(base, &args.overrides)?;
            run_files(config, args.files, args.baseline.as_deref()).await
        }
        Command::Profile(args) => {
            let config = apply_overrides(base, &args.overrides)?;
            let profile = blocking(move || profiler::profile(&args.file, &config)).await?;
            emit_json(&profile, args.output.as_deref()).await
        }
        Command::Detect(args) => {
            let config = apply_overrides(base, &args.file.overrides)?;
            let baseline = load_baseline(args.baseline.as_deref())?;
            let file = args.file.file;
            let anomalies =
                blocking(move || drift::detect(&file, baseline.as_ref(), &config)).await?;
            emit_json(&anomalies, args.file.output.as_deref()).await
        }
        Command::Scan(args) => {
            let config = apply_overrides(base, &args.overrides)?;
            let issues = blocking(move || compliance::scan(&args.file, &config)).await?;
            emit_json(&issues, args.output.as_deref()).await
        }
        Command::Repair(args) => {
            let config = apply_overrides(base, &args.overrides)?;
            let cleaned = blocking(move || repair::repair(&args.file, &config)).await?;
            println!("{}", cleaned.display());
            Ok(())
        }
        Command::Baseline(args) => {
            let config = apply_overrides(base, &args.overrides)?;
            let file = args.file;
            let profile = blocking(move || profiler::profile(&file, &config)).await?;
            JsonBaselineStore::new(&args.out)
                .save(&profile)
                .with_context(|| format!("Failed to save baseline to {}", args.out.display()))?;
            println!("{}", args.out.display());
            Ok(())
        }
    }
}

/// Runs a synchronous stage on the blocking pool.
async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> hawksight_core::Result<T> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(task)
        .await
        .context("Stage task panicked or was cancelled")?;
    Ok(outcome?)
}

fn load_baseline(path: Option<&Path>) -> Result<Option<Profile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let baseline = JsonBaselineStore::new(path)
        .load()
        .with_context(|| format!("Failed to load baseline {}", path.display()))?;
    if baseline.is_none() {
        info!("Baseline {} not found; drift checks skipped", path.display());
    }
    Ok(baseline)
}

/// Runs the full pipeline over every file concurrently, one context each.
async fn run_files(
    config: GovernanceConfig,
    files: Vec<PathBuf>,
    baseline_path: Option<&Path>,
) -> Result<()> {
    let baseline = load_baseline(baseline_path)?;
    let pipeline = GovernancePipeline::new(config);
    let total = files.len();

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let pipeline = pipeline.clone();
            let baseline = baseline.clone();
            let task_file = file.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let mut ctx = RunContext::new();
                if let Some(baseline) = baseline {
                    ctx = ctx.with_baseline(baseline);
                }
                pipeline.run(&task_file, &mut ctx)
            });
            (file, handle)
        })
        .collect();

    let mut failures = 0usize;
    for (file, handle) in handles {
        match handle.await {
            Ok(Ok(report_path)) => {
                info!("{} -> {}", file.display(), report_path.display());
                println!("{}", report_path.display());
            }
            Ok(Err(e)) => {
                failures = failures.saturating_add(1);
                error!("Governance run failed for {}: {}", file.display(), e);
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                error!("Governance run for {} did not complete: {}", file.display(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} governance runs failed", failures, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "hawksight",
            "-vv",
            "run",
            "a.csv",
            "b.csv",
            "--baseline",
            "base.json",
            "--drift-threshold",
            "0.3",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.files, [PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(args.baseline, Some(PathBuf::from("base.json")));
        assert_eq!(args.overrides.drift_threshold, Some(0.3));
    }

    #[test]
    fn test_cli_run_requires_files() {
        assert!(Cli::try_parse_from(["hawksight", "run"]).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hawksight", "scan", "x.csv", "-q", "--log-json"]).unwrap();
        assert!(cli.global.quiet);
        assert!(cli.global.log_json);
    }

    #[test]
    fn test_cli_detect_with_output() {
        let cli =
            Cli::try_parse_from(["hawksight", "detect", "x.csv", "-o", "out.json"]).unwrap();
        let Command::Detect(args) = cli.command else {
            panic!("expected detect command");
        };
        assert_eq!(args.file.output, Some(PathBuf::from("out.json")));
        assert!(args.baseline.is_none());
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn test_run_files_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "id\n1\n1\n").unwrap();
        std::fs::write(&b, "id\n2\n").unwrap();
        let config = GovernanceConfig::default().with_reports_dir(dir.path().join("reports"));

        run_files(config, vec![a, b], None).await.unwrap();

        assert!(dir.path().join("a_cleaned.csv").exists());
        assert!(dir.path().join("b_cleaned.csv").exists());
        assert_eq!(std::fs::read_dir(dir.path().join("reports")).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_run_files_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        std::fs::write(&good, "id\n1\n").unwrap();
        let config = GovernanceConfig::default().with_reports_dir(dir.path().join("reports"));

        let err = run_files(config, vec![good, dir.path().join("missing.csv")], None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("1 of 2"));
    }
}
