//! # compass-cfg entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compass_cli::config::{run_config, ConfigArgs};
use compass_cli::mesh::{run_mesh, MeshArgs};
use compass_cli::streams::{run_streams, StreamsArgs};
use compass_cli::EXIT_ERROR;

/// Inspect, check and merge test-case setup inputs: `[mesh]` config sections
/// and stream manifests.
#[derive(Parser, Debug)]
#[command(name = "compass-cfg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mesh-density parameters from layered config files.
    Mesh(MeshArgs),

    /// Stream manifests: summary, validation, template merge.
    Streams(StreamsArgs),

    /// Layered config files.
    Config(ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Mesh(args) => run_mesh(&args),
        Commands::Streams(args) => run_streams(&args),
        Commands::Config(args) => run_config(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
