//! # Error Types
//!
//! Config files are one-shot setup inputs: every failure here is terminal and
//! reported to the user before any long-running work begins.
//!
//! - [`MalformedConfig`] describes what is wrong with the text itself
//!   (syntax, duplicates, missing keys, uncoercible values). It carries no
//!   path so in-memory parses can use it directly.
//! - [`ConfigError`] adds where the text came from, plus the I/O failures of
//!   reading it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a config file from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("required config file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The config file exists but could not be read.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config text is malformed.
    #[error("malformed config {origin}: {reason}")]
    Malformed {
        /// The file (or files, for layered configs) the text came from.
        origin: String,
        reason: MalformedConfig,
    },
}

impl ConfigError {
    /// Attach an origin to a malformation.
    pub fn malformed(origin: impl Into<String>, reason: MalformedConfig) -> Self {
        Self::Malformed {
            origin: origin.into(),
            reason,
        }
    }

    /// Whether the failure is about the config content rather than file access.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// The content-level reason, if this is a malformation.
    pub fn as_malformed(&self) -> Option<&MalformedConfig> {
        match self {
            Self::Malformed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A structural or type problem in config text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedConfig {
    /// A line that is neither a section header, an option, a comment nor a
    /// continuation.
    #[error("line {line}: {detail}")]
    Syntax { line: usize, detail: String },

    /// The same section header appears twice in one file.
    #[error("line {line}: section [{section}] is declared more than once")]
    DuplicateSection { section: String, line: usize },

    /// The same option appears twice in one section of one file.
    #[error("line {line}: option '{key}' in section [{section}] is declared more than once")]
    DuplicateOption {
        section: String,
        key: String,
        line: usize,
    },

    /// A required section is absent.
    #[error("missing section [{section}]")]
    MissingSection { section: String },

    /// A required option is absent.
    #[error("missing option '{key}' in section [{section}]")]
    MissingOption { section: String, key: String },

    /// An option value cannot be coerced to the type its key requires.
    #[error("option '{key}' in section [{section}]: cannot read {value:?} as {expected}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    /// A `${...}` reference could not be expanded.
    #[error("option '{key}' in section [{section}]: {detail}")]
    Interpolation {
        section: String,
        key: String,
        detail: String,
    },
}

/// Result type alias for config file operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let err = ConfigError::FileNotFound {
            path: PathBuf::from("/tmp/missing.cfg"),
        };
        assert!(format!("{err}").contains("/tmp/missing.cfg"));
        assert!(!err.is_malformed());
    }

    #[test]
    fn malformed_display_includes_origin_and_reason() {
        let err = ConfigError::malformed(
            "antarctica.cfg",
            MalformedConfig::MissingOption {
                section: "mesh".to_string(),
                key: "levels".to_string(),
            },
        );
        let msg = format!("{err}");
        assert!(msg.contains("antarctica.cfg"));
        assert!(msg.contains("levels"));
        assert!(err.is_malformed());
    }

    #[test]
    fn invalid_value_names_expected_type() {
        let err = MalformedConfig::InvalidValue {
            section: "mesh".to_string(),
            key: "use_bed".to_string(),
            value: "maybe".to_string(),
            expected: "boolean",
        };
        let msg = format!("{err}");
        assert!(msg.contains("\"maybe\""));
        assert!(msg.contains("boolean"));
    }

    #[test]
    fn as_malformed_exposes_reason() {
        let reason = MalformedConfig::MissingSection {
            section: "mesh".to_string(),
        };
        let err = ConfigError::malformed("x.cfg", reason.clone());
        assert_eq!(err.as_malformed(), Some(&reason));

        let io = ConfigError::Io {
            path: PathBuf::from("x.cfg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(io.as_malformed().is_none());
        assert!(!format!("{io}").contains("denied"));
        let cause = std::error::Error::source(&io).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("denied"));
    }

    #[test]
    fn malformed_reason_is_not_repeated_as_cause() {
        let err = ConfigError::malformed(
            "x.cfg",
            MalformedConfig::MissingSection {
                section: "mesh".to_string(),
            },
        );
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(format!("{err}").matches("[mesh]").count(), 1);
    }
}
