//! # Config Subcommand
//!
//! `compass-cfg config merge FILES... [-o OUT]`: combine layered config files
//! into the single file a test case's work directory receives.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use compass_core::{ConfigDocument, ConfigError};

use crate::{load_or_report, write_output, EXIT_FAILURE, EXIT_OK};

/// Arguments for the `compass-cfg config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Layer config files in order and write the combined result.
    Merge {
        /// Config files, later ones overriding earlier ones.
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output file (stdout if omitted).
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs) -> Result<u8> {
    match &args.command {
        ConfigCommand::Merge { files, output } => {
            let Some(doc) = load_or_report(
                ConfigDocument::read_layered(files),
                ConfigError::is_malformed,
            )?
            else {
                return Ok(EXIT_FAILURE);
            };
            tracing::debug!(sources = doc.sources().len(), "combined config files");
            write_output(output.as_deref(), &doc.to_string())?;
            Ok(EXIT_OK)
        }
    }
}
