//! # compass-streams: Stream Manifests
//!
//! A stream manifest tells the model which fields to read or write, to which
//! files, and how often. Test cases ship a manifest (for instance
//! `streams.land_ice_fluxes`) that is merged into the core's template before
//! a run.
//!
//! - [`StreamLoader`] ([`parser`]): parse and validate `<streams>` XML.
//! - [`StreamManifest`] / [`Stream`] / [`StreamEntry`] ([`model`]): the typed
//!   declarations.
//! - [`ResolvedEntry`] ([`resolve`]): embedded stream references followed.
//! - [`StreamManifest::apply_overrides`] ([`merge`]) and
//!   [`StreamManifest::to_xml`] ([`writer`]): template merging and output.
//! - [`FieldRegistry`] ([`registry`]): checking names against a model build.
//! - [`Interval`], [`ModelTimestamp`], [`ModelDuration`], [`FilenameTemplate`]:
//!   attribute value types.
//!
//! Loading is all-or-nothing: the first structural violation is returned as a
//! [`MalformedManifest`] and no partial manifest is produced.

pub mod error;
pub mod interval;
pub mod merge;
pub mod model;
pub mod parser;
pub mod registry;
pub mod resolve;
pub mod template;
pub mod time;
pub mod writer;

use std::path::Path;

pub use error::{MalformedManifest, ManifestError, ManifestResult};
pub use interval::Interval;
pub use model::{ClobberMode, Stream, StreamEntry, StreamManifest, StreamType};
pub use parser::{StreamLoader, DEFAULT_KNOWN_STREAMS};
pub use registry::{FieldRegistry, UnresolvedField};
pub use resolve::ResolvedEntry;
pub use template::{FilenameTemplate, Placeholder};
pub use time::{InvalidTimestamp, ModelDuration, ModelTimestamp};

/// Load a manifest file, accepting references to the ocean core's
/// predeclared streams ([`DEFAULT_KNOWN_STREAMS`]).
pub fn load(path: &Path) -> ManifestResult<StreamManifest> {
    StreamLoader::default().load(path)
}
