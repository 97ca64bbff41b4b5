//! # Mesh Section
//!
//! Typed view of the `[mesh]` config section. Every option listed on
//! [`MeshConfig`] is required; options the loader does not know are kept in
//! [`MeshConfig::extra`] so they survive a write.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use compass_core::{ConfigDocument, ConfigError, ConfigValue, MalformedConfig};

/// Name of the config section holding the mesh parameters.
pub const MESH_SECTION: &str = "mesh";

/// Float-valued options, in the order they are written.
pub const FLOAT_KEYS: [&str; 15] = [
    "x_min",
    "x_max",
    "y_min",
    "y_max",
    "cull_distance",
    "min_spac",
    "max_spac",
    "high_log_speed",
    "low_log_speed",
    "high_dist",
    "low_dist",
    "high_dist_bed",
    "low_dist_bed",
    "low_bed",
    "high_bed",
];

/// Density-function toggles, in the order they are written.
pub const TOGGLE_KEYS: [&str; 4] = [
    "use_speed",
    "use_dist_to_grounding_line",
    "use_dist_to_edge",
    "use_bed",
];

/// Parameters controlling mesh-density generation.
///
/// Lengths are in meters unless noted; speeds are log10 of m/yr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Western bound of the domain (projected meters).
    pub x_min: f64,
    /// Eastern bound of the domain (projected meters).
    pub x_max: f64,
    /// Southern bound of the domain (projected meters).
    pub y_min: f64,
    /// Northern bound of the domain (projected meters).
    pub y_max: f64,
    /// Number of refinement levels. Always at least 1.
    pub levels: u32,
    /// Distance from the ice margin beyond which cells are culled, in km.
    /// Values `<= 0` disable culling; see [`MeshConfig::culling`].
    pub cull_distance: f64,
    /// Finest cell spacing.
    pub min_spac: f64,
    /// Coarsest cell spacing.
    pub max_spac: f64,
    /// Speed at and above which spacing is `min_spac`.
    pub high_log_speed: f64,
    /// Speed at and below which spacing is `max_spac`.
    pub low_log_speed: f64,
    /// Distance at which spacing reaches `max_spac`.
    pub high_dist: f64,
    /// Distance within which spacing is `min_spac`.
    pub low_dist: f64,
    /// Distance at which bed topography stops affecting spacing.
    pub high_dist_bed: f64,
    /// Distance within which bed topography has its full effect.
    pub low_dist_bed: f64,
    /// Bed elevation beneath which spacing is minimized.
    pub low_bed: f64,
    /// Bed elevation above which spacing is maximized.
    pub high_bed: f64,
    pub use_speed: bool,
    pub use_dist_to_grounding_line: bool,
    pub use_dist_to_edge: bool,
    pub use_bed: bool,
    /// Options in `[mesh]` not listed above, raw.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Whether, and how far from the margin, cells are culled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Culling {
    /// `cull_distance <= 0`: keep every cell.
    Disabled,
    /// Cull cells farther than `km` from the ice margin.
    Within { km: f64 },
}

/// A criterion the mesh generator uses to set local cell spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityFunction {
    Speed,
    DistToGroundingLine,
    DistToEdge,
    Bed,
}

impl MeshConfig {
    /// Read the `[mesh]` section of a parsed document.
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, MalformedConfig> {
        let section = doc
            .section(MESH_SECTION)
            .ok_or_else(|| MalformedConfig::MissingSection {
                section: MESH_SECTION.to_string(),
            })?;

        let float = |key: &str| doc.get_as::<f64>(MESH_SECTION, key);
        let flag = |key: &str| doc.get_as::<bool>(MESH_SECTION, key);

        let extra: BTreeMap<String, String> = section
            .iter()
            .filter(|(key, _)| !is_known_key(key))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        for key in extra.keys() {
            tracing::debug!(%key, "unrecognized [mesh] option kept as-is");
        }

        Ok(Self {
            x_min: float("x_min")?,
            x_max: float("x_max")?,
            y_min: float("y_min")?,
            y_max: float("y_max")?,
            levels: doc.get_as::<NonZeroU32>(MESH_SECTION, "levels")?.get(),
            cull_distance: float("cull_distance")?,
            min_spac: float("min_spac")?,
            max_spac: float("max_spac")?,
            high_log_speed: float("high_log_speed")?,
            low_log_speed: float("low_log_speed")?,
            high_dist: float("high_dist")?,
            low_dist: float("low_dist")?,
            high_dist_bed: float("high_dist_bed")?,
            low_dist_bed: float("low_dist_bed")?,
            low_bed: float("low_bed")?,
            high_bed: float("high_bed")?,
            use_speed: flag("use_speed")?,
            use_dist_to_grounding_line: flag("use_dist_to_grounding_line")?,
            use_dist_to_edge: flag("use_dist_to_edge")?,
            use_bed: flag("use_bed")?,
            extra,
        })
    }

    /// Write the parameters into a new document with a single `[mesh]` section.
    pub fn to_document(&self) -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        let section = doc.section_entry(MESH_SECTION);
        section.set("levels", self.levels.render());
        for (key, value) in FLOAT_KEYS.iter().zip(self.float_values()) {
            section.set(key, value.render());
        }
        for (key, value) in TOGGLE_KEYS.iter().zip(self.toggle_values()) {
            section.set(key, value.render());
        }
        for (key, value) in &self.extra {
            section.set(key, value.clone());
        }
        doc
    }

    /// Margin culling implied by `cull_distance`.
    pub fn culling(&self) -> Culling {
        if self.cull_distance > 0.0 {
            Culling::Within {
                km: self.cull_distance,
            }
        } else {
            Culling::Disabled
        }
    }

    /// The density functions switched on, in toggle order.
    pub fn density_functions(&self) -> Vec<DensityFunction> {
        [
            (self.use_speed, DensityFunction::Speed),
            (
                self.use_dist_to_grounding_line,
                DensityFunction::DistToGroundingLine,
            ),
            (self.use_dist_to_edge, DensityFunction::DistToEdge),
            (self.use_bed, DensityFunction::Bed),
        ]
        .into_iter()
        .filter_map(|(on, f)| on.then_some(f))
        .collect()
    }

    fn float_values(&self) -> [f64; 15] {
        [
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max,
            self.cull_distance,
            self.min_spac,
            self.max_spac,
            self.high_log_speed,
            self.low_log_speed,
            self.high_dist,
            self.low_dist,
            self.high_dist_bed,
            self.low_dist_bed,
            self.low_bed,
            self.high_bed,
        ]
    }

    fn toggle_values(&self) -> [bool; 4] {
        [
            self.use_speed,
            self.use_dist_to_grounding_line,
            self.use_dist_to_edge,
            self.use_bed,
        ]
    }
}

fn is_known_key(key: &str) -> bool {
    key == "levels" || FLOAT_KEYS.contains(&key) || TOGGLE_KEYS.contains(&key)
}

impl FromStr for MeshConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let doc = ConfigDocument::parse(s)
            .map_err(|reason| ConfigError::malformed("<memory>", reason))?;
        Self::from_document(&doc).map_err(|reason| doc.malformed(reason))
    }
}
