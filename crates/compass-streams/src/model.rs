//! # Stream Manifest Model
//!
//! A [`StreamManifest`] is an ordered list of [`Stream`] declarations. Each
//! stream binds a set of model fields to a file template with a direction
//! ([`StreamType`]) and a cadence ([`Interval`]). Its contents are
//! [`StreamEntry`] values: single fields, field arrays, field structs, or an
//! embedded stream whose contents are included by reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::template::FilenameTemplate;
use crate::time::ModelTimestamp;

// ---------------------------------------------------------------------------
// Attribute enums
// ---------------------------------------------------------------------------

/// Direction of a stream, from its `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    #[serde(rename = "input")]
    Input,
    #[serde(rename = "output")]
    Output,
    #[serde(rename = "input;output")]
    InputOutput,
    #[serde(rename = "none")]
    None,
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::InputOutput => "input;output",
            Self::None => "none",
        }
    }

    /// Whether the stream is read, and so may carry `input_interval`.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input | Self::InputOutput)
    }

    /// Whether the stream is written, and so may carry `output_interval`.
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output | Self::InputOutput)
    }
}

impl FromStr for StreamType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            "input;output" | "output;input" => Ok(Self::InputOutput),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for output files that already exist, from `clobber_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClobberMode {
    /// Refuse to touch an existing file.
    NeverModify,
    /// Overwrite records that collide, keep the rest of the file.
    Overwrite,
    /// Empty an existing file before writing.
    Truncate,
    /// Replace an existing file with a new one.
    ReplaceFiles,
    /// Add records to the end of an existing file.
    Append,
}

impl ClobberMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverModify => "never_modify",
            Self::Overwrite => "overwrite",
            Self::Truncate => "truncate",
            Self::ReplaceFiles => "replace_files",
            Self::Append => "append",
        }
    }
}

impl FromStr for ClobberMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "never_modify" => Ok(Self::NeverModify),
            "overwrite" => Ok(Self::Overwrite),
            "truncate" => Ok(Self::Truncate),
            "replace_files" => Ok(Self::ReplaceFiles),
            "append" => Ok(Self::Append),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ClobberMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

/// One child element of a `<stream>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum StreamEntry {
    /// `<var name="..."/>`: a single field.
    Var(String),
    /// `<var_array name="..."/>`: a named collection of same-shaped fields.
    VarArray(String),
    /// `<var_struct name="..."/>`: every field of a registry struct.
    VarStruct(String),
    /// `<stream name="..."/>`: the contents of another stream.
    Stream(String),
}

impl StreamEntry {
    /// The element name this entry is written as.
    pub fn element(&self) -> &'static str {
        match self {
            Self::Var(_) => "var",
            Self::VarArray(_) => "var_array",
            Self::VarStruct(_) => "var_struct",
            Self::Stream(_) => "stream",
        }
    }

    /// Build an entry from its element name.
    pub fn from_element(element: &str, name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        match element {
            "var" => Some(Self::Var(name)),
            "var_array" => Some(Self::VarArray(name)),
            "var_struct" => Some(Self::VarStruct(name)),
            "stream" => Some(Self::Stream(name)),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Var(name) | Self::VarArray(name) | Self::VarStruct(name) | Self::Stream(name) => {
                name
            }
        }
    }

    /// Whether this entry names model fields, as opposed to another stream.
    pub fn is_field(&self) -> bool {
        !matches!(self, Self::Stream(_))
    }
}

impl fmt::Display for StreamEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} name=\"{}\"/>", self.element(), self.name())
    }
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// One `<stream>` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
    #[serde(rename = "type")]
    pub stream_type: StreamType,
    pub filename_template: FilenameTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_interval: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_interval: Option<Interval>,
    /// Epoch that `output_interval` counts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_time: Option<ModelTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clobber_mode: Option<ClobberMode>,
    /// Remaining attributes (`precision`, `filename_interval`, `packages`...)
    /// in declaration order, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    pub contents: Vec<StreamEntry>,
}

impl Stream {
    /// A stream with no optional attributes and no contents.
    pub fn new(
        name: impl Into<String>,
        stream_type: StreamType,
        filename_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stream_type,
            filename_template: FilenameTemplate::new(filename_template),
            input_interval: None,
            output_interval: None,
            reference_time: None,
            clobber_mode: None,
            attributes: Vec::new(),
            contents: Vec::new(),
        }
    }

    /// The cadence matching the stream's direction. For read-write streams the
    /// output cadence takes precedence.
    pub fn cadence(&self) -> Option<&Interval> {
        match self.stream_type {
            StreamType::Input => self.input_interval.as_ref(),
            StreamType::Output => self.output_interval.as_ref(),
            StreamType::InputOutput => self
                .output_interval
                .as_ref()
                .or(self.input_interval.as_ref()),
            StreamType::None => None,
        }
    }

    /// A pass-through attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a pass-through attribute, keeping its position if present.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Field entries (everything except embedded streams), in order.
    pub fn variables(&self) -> impl Iterator<Item = &StreamEntry> {
        self.contents.iter().filter(|e| e.is_field())
    }

    /// Names of embedded streams, in order.
    pub fn embedded_streams(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().filter_map(|e| match e {
            StreamEntry::Stream(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Whether the stream lists this exact entry.
    pub fn contains(&self, entry: &StreamEntry) -> bool {
        self.contents.contains(entry)
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// An ordered collection of stream declarations with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamManifest {
    streams: Vec<Stream>,
}

impl StreamManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a manifest from streams without validating them. Loaders
    /// validate; this is for programmatic construction.
    pub fn from_streams(streams: Vec<Stream>) -> Self {
        Self { streams }
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stream> {
        self.streams.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Stream> {
        self.streams.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Stream> {
        self.streams.iter_mut().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stream names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub(crate) fn push(&mut self, stream: Stream) {
        self.streams.push(stream);
    }
}

impl<'a> IntoIterator for &'a StreamManifest {
    type Item = &'a Stream;
    type IntoIter = std::slice::Iter<'a, Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.iter()
    }
}
