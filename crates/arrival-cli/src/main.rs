//! arrival — plan and run arrival-rate load schedules.
//!
//! # Usage
//!
//! ```text
//! arrival init ramping --output ramping.toml
//! arrival plan ramping.toml --segment 0:1/3 --sequence 0,1/3,2/3,1
//! arrival run ramping.toml --iteration-duration 250ms
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use arrival_segment::{ExecutionSegment, ExecutionSegmentSequence};

mod commands;

#[derive(Parser)]
#[command(
    name = "arrival",
    about = "Arrival — open-model load scheduling",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file.
    Init {
        /// Test name.
        #[arg(default_value = "default")]
        name: String,
        /// Where to write the config.
        #[arg(short, long, default_value = "arrival.toml")]
        output: PathBuf,
    },
    /// Print the start offsets this instance would run, without running.
    Plan {
        /// Path to the TOML config.
        config: PathBuf,
        #[command(flatten)]
        segmentation: Segmentation,
        /// Print at most this many offsets.
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run the schedule against a synthetic workload that sleeps.
    Run {
        /// Path to the TOML config.
        config: PathBuf,
        #[command(flatten)]
        segmentation: Segmentation,
        /// How long each synthetic iteration sleeps.
        #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
        iteration_duration: Duration,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

/// Overrides for the config's `[execution]` section.
#[derive(clap::Args)]
struct Segmentation {
    /// This instance's share, e.g. `0:1/3`.
    #[arg(long)]
    segment: Option<ExecutionSegment>,
    /// Every instance's share, e.g. `0,1/3,2/3,1`.
    #[arg(long)]
    sequence: Option<ExecutionSegmentSequence>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,arrival=debug"));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    match cli.command {
        Commands::Init { name, output } => commands::init::init(&name, &output),
        Commands::Plan {
            config,
            segmentation,
            limit,
            format,
        } => {
            let config = commands::load(&config, segmentation.segment, segmentation.sequence)?;
            commands::plan::plan(&config, limit, &format)
        }
        Commands::Run {
            config,
            segmentation,
            iteration_duration,
            format,
        } => {
            let config = commands::load(&config, segmentation.segment, segmentation.sequence)?;
            commands::run::run(config, iteration_duration, &format).await
        }
    }
}
