//! # compass-mesh: Mesh-Density Parameters
//!
//! Ice-sheet test cases describe the variable-resolution mesh they need in
//! a `[mesh]` config section: domain bounds, refinement levels, margin
//! culling, and the thresholds of the density functions (ice speed, distance
//! to grounding line or margin, bed elevation) together with toggles
//! selecting which of those functions apply.
//!
//! - [`MeshConfig`] ([`config`]): the typed section, read with
//!   [`load`] / [`load_layered`].
//! - [`MeshReport`] ([`check`]): consistency findings the file format itself
//!   does not enforce (`min_spac < max_spac`, at least one density function...).
//!
//! The mesh generator that consumes these values is external; this crate
//! only reads, checks and writes them.

pub mod check;
pub mod config;

use std::path::Path;

use compass_core::{ConfigDocument, ConfigResult};

pub use check::MeshReport;
pub use config::{Culling, DensityFunction, MeshConfig, MESH_SECTION};

/// Load the `[mesh]` section of a config file.
///
/// Fails with a malformed-config error when a required option is absent or
/// cannot be coerced to its type. Consistency between options is not checked
/// here; see [`MeshConfig::check`].
pub fn load(path: &Path) -> ConfigResult<MeshConfig> {
    let doc = ConfigDocument::read(path)?;
    MeshConfig::from_document(&doc).map_err(|source| doc.malformed(source))
}

/// Load the `[mesh]` section from several layered config files.
///
/// Files are read in order; options in later files replace those in earlier
/// ones, so a test case can override only the values it changes.
pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> ConfigResult<MeshConfig> {
    let doc = ConfigDocument::read_layered(paths)?;
    MeshConfig::from_document(&doc).map_err(|source| doc.malformed(source))
}
