//! Stream manifest error types.
//!
//! [`MalformedManifest`] names the structural violation; [`ManifestError`]
//! adds the file it was found in, plus read failures. A manifest is a
//! one-shot setup input, so the first violation aborts the load.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::StreamType;

/// Errors raised while loading a stream manifest from disk.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file does not exist.
    #[error("required manifest not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The manifest file exists but could not be read.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The manifest content violates the stream schema.
    #[error("malformed manifest {origin}: {reason}")]
    Malformed {
        origin: String,
        reason: MalformedManifest,
    },
}

impl ManifestError {
    /// Whether the failure is about the manifest content rather than file access.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// The content-level reason, if this is a malformation.
    pub fn as_malformed(&self) -> Option<&MalformedManifest> {
        match self {
            Self::Malformed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A structural violation in stream manifest text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedManifest {
    /// The markup itself does not parse.
    #[error("XML syntax error near byte {position}: {detail}")]
    Xml { position: u64, detail: String },

    /// The document is not wrapped in `<streams>`.
    #[error("expected a <streams> root element, found {found}")]
    MissingRoot { found: String },

    /// An element appears where the schema does not allow it.
    #[error("unexpected <{element}> inside {parent}")]
    UnexpectedElement { element: String, parent: String },

    /// Character data appears where only elements are allowed.
    #[error("unexpected text {text:?} inside {parent}")]
    UnexpectedText { parent: String, text: String },

    /// A required attribute is absent (or empty, for `name`).
    #[error("<{element}>{} is missing required attribute '{attribute}'", in_stream(.stream))]
    MissingAttribute {
        element: String,
        stream: Option<String>,
        attribute: &'static str,
    },

    /// `filename_template` is present but blank.
    #[error("stream '{stream}' has an empty filename_template")]
    EmptyFilenameTemplate { stream: String },

    /// An attribute value is not one the schema accepts.
    #[error("stream '{stream}': attribute {attribute}={value:?} is not a valid {expected}")]
    InvalidAttribute {
        stream: String,
        attribute: String,
        value: String,
        expected: &'static str,
    },

    /// A cadence attribute that does not match the stream's direction.
    #[error("stream '{stream}' of type {stream_type} cannot declare {attribute}")]
    IntervalMismatch {
        stream: String,
        stream_type: StreamType,
        attribute: &'static str,
    },

    /// Two streams share a name.
    #[error("stream '{name}' is declared more than once")]
    DuplicateStream { name: String },

    /// The same variable entry appears twice in one stream.
    #[error("stream '{stream}' lists {entry} more than once")]
    DuplicateEntry { stream: String, entry: String },

    /// An embedded `<stream name="..."/>` names no known stream.
    #[error("stream '{stream}' embeds unknown stream '{reference}'")]
    UnknownStreamReference { stream: String, reference: String },

    /// Embedded stream references form a cycle.
    #[error("embedded streams form a cycle: {}", .cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },
}

fn in_stream(stream: &Option<String>) -> String {
    match stream {
        Some(name) => format!(" in stream '{name}'"),
        None => String::new(),
    }
}

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;
