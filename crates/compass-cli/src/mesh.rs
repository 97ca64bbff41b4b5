//! # Mesh Subcommand
//!
//! `compass-cfg mesh show|check FILES...`: read the `[mesh]` section from one
//! or more layered config files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use compass_core::ConfigError;
use compass_mesh::MeshConfig;

use crate::{load_or_report, EXIT_FAILURE, EXIT_OK};

/// Arguments for the `compass-cfg mesh` subcommand.
#[derive(Args, Debug)]
pub struct MeshArgs {
    #[command(subcommand)]
    pub command: MeshCommand,
}

#[derive(Subcommand, Debug)]
pub enum MeshCommand {
    /// Print the typed mesh parameters as JSON.
    Show {
        /// Config files, later ones overriding earlier ones.
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Check the mesh parameters for consistency.
    Check {
        /// Config files, later ones overriding earlier ones.
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
}

/// Execute the mesh subcommand.
///
/// Returns exit code: 0 on success, 1 on a malformed or inconsistent config.
pub fn run_mesh(args: &MeshArgs) -> Result<u8> {
    match &args.command {
        MeshCommand::Show { files } => {
            let Some(mesh) = load(files)? else {
                return Ok(EXIT_FAILURE);
            };
            let json = serde_json::to_string_pretty(&mesh).context("failed to serialize mesh")?;
            println!("{json}");
            Ok(EXIT_OK)
        }
        MeshCommand::Check { files } => {
            let Some(mesh) = load(files)? else {
                return Ok(EXIT_FAILURE);
            };
            Ok(check(&mesh))
        }
    }
}

fn load(files: &[PathBuf]) -> Result<Option<MeshConfig>> {
    load_or_report(compass_mesh::load_layered(files), ConfigError::is_malformed)
}

fn check(mesh: &MeshConfig) -> u8 {
    let report = mesh.check();
    for warning in &report.warnings {
        println!("  WARN: {warning}");
    }
    for error in &report.errors {
        println!("  FAIL: {error}");
    }
    if report.is_ok() {
        println!("mesh: OK ({} warning(s))", report.warnings.len());
        EXIT_OK
    } else {
        println!("mesh: {} error(s)", report.errors.len());
        EXIT_FAILURE
    }
}
