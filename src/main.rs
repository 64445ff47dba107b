//! Episode Merger
//!
//! Finds the parts of multi-part audio episodes in one directory
//! ("Folge 12 Kapitel 1", "Folge 12 Kapitel 2", ...), checks that every part
//! is present and joins them into a single file with a canonical name.

mod config;
mod config_file;
mod error;
mod ffmpeg;
mod grouping;
mod index;
#[cfg(test)]
mod integration;
mod merge;
mod naming;
mod sequence;
mod transcode;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::MergeConfig;
use crate::config_file::ConfigFile;
use crate::error::{MergeError, Result};
use crate::grouping::GroupingPolicy;
use crate::merge::MergeOrchestrator;
use crate::transcode::FfmpegConcatenator;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "episode-merge";

/// Grouping policy as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    ExactTag,
    Similarity,
}

impl From<PolicyArg> for GroupingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::ExactTag => GroupingPolicy::ExactTag,
            PolicyArg::Similarity => GroupingPolicy::Similarity,
        }
    }
}

/// Merge multi-part audio episodes into single files.
#[derive(Parser, Debug, Clone)]
#[command(name = "episode-merge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the episode parts.
    directory: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How files are grouped into episodes.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Title similarity threshold for the similarity policy (0..1).
    #[arg(long)]
    threshold: Option<f64>,

    /// Only plan and log, write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Leave existing output files alone instead of overwriting them.
    #[arg(long)]
    no_overwrite: bool,

    /// Write a default configuration file to this path and exit.
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(path) = &cli.write_default_config {
        return match config_file::generate_default_config(path) {
            Ok(()) => {
                println!("Default configuration written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level, &config.log_format);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: MergeConfig) -> Result<()> {
    ffmpeg::init()?;
    ffmpeg::install_log_filter();
    tracing::info!("FFmpeg version: {}", ffmpeg::version_info());

    let directory = match &config.directory {
        Some(dir) => dir.clone(),
        None => prompt_directory()?,
    };

    let concatenator = FfmpegConcatenator::new(config.output.bitrate);
    let orchestrator = MergeOrchestrator::new(config, concatenator);
    orchestrator.run(&directory)?;
    Ok(())
}

/// Defaults, then the config file, then command-line flags.
fn load_config(cli: &Cli) -> Result<MergeConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigFile::from_file(path)?.into_merge_config(),
        None => MergeConfig::default(),
    };
    apply_cli(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_cli(config: &mut MergeConfig, cli: &Cli) {
    if let Some(dir) = &cli.directory {
        config.directory = Some(dir.clone());
    }
    if let Some(policy) = cli.policy {
        config.grouping.policy = policy.into();
    }
    if let Some(threshold) = cli.threshold {
        config.grouping.similarity_threshold = threshold;
    }
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if let Some(report) = &cli.report {
        config.output.report_path = Some(report.clone());
    }
    if cli.no_overwrite {
        config.output.overwrite_existing = false;
    }
}

/// Ask for the directory on stdin.
fn prompt_directory() -> Result<PathBuf> {
    print!("Directory to process: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Err(MergeError::DirectoryNotFound(PathBuf::new()));
    }
    Ok(Path::new(line).to_path_buf())
}

/// Initialize logging with tracing
fn init_logging(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("episode_merge={0},ffmpeg={0}", level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
