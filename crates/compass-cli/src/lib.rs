//! # compass-cli: `compass-cfg` Command-Line Interface
//!
//! Inspect, check and merge the setup inputs of a test case before the model
//! runs.
//!
//! ## Subcommands
//!
//! - `mesh show|check`: the `[mesh]` section of layered config files
//! - `streams show|check|merge`: stream manifests
//! - `config merge`: combine layered config files into one
//!
//! ## Exit codes
//!
//! `0` success, `1` the input is malformed or fails a check, `2` the command
//! could not run (missing file, unwritable output).
//!
//! Handlers print their report to stdout and return the exit code; they
//! delegate all parsing and checking to the domain crates.

pub mod config;
pub mod mesh;
pub mod streams;

use std::path::Path;

use anyhow::{Context, Result};

/// Every check passed.
pub const EXIT_OK: u8 = 0;
/// The input is malformed or a check failed.
pub const EXIT_FAILURE: u8 = 1;
/// The command could not run.
pub const EXIT_ERROR: u8 = 2;

/// Split a load failure into a content problem, which is reported and yields
/// `None`, and an access problem, which is propagated.
pub(crate) fn load_or_report<T, E>(
    result: std::result::Result<T, E>,
    is_malformed: impl Fn(&E) -> bool,
) -> Result<Option<T>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if is_malformed(&err) => {
            println!("FAIL: {err}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Write `text` to `path`, or to stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => print!("{text}"),
    }
    Ok(())
}
