//! # Stream Manifest Parser
//!
//! Reads `<streams>` XML into a [`StreamManifest`]. The document shape is:
//!
//! ```text
//! <streams>
//!   <stream name=".." type=".." filename_template=".." [more attributes]>
//!     <var name=".."/> | <var_array name=".."/> | <var_struct name=".."/> | <stream name=".."/>
//!   </stream>
//! </streams>
//! ```
//!
//! Comments and the XML declaration are ignored; any other text is an error.
//! Embedded `<stream name=".."/>` references must name a stream declared in
//! the same file or one the model core predeclares (see
//! [`StreamLoader::with_known_streams`]).

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{MalformedManifest, ManifestError, ManifestResult};
use crate::interval::Interval;
use crate::model::{ClobberMode, Stream, StreamEntry, StreamManifest, StreamType};
use crate::resolve;
use crate::template::FilenameTemplate;
use crate::time::ModelTimestamp;

/// Streams the ocean core declares itself, which test-case manifests may
/// embed without declaring.
pub const DEFAULT_KNOWN_STREAMS: [&str; 4] = ["mesh", "input", "restart", "output"];

const ROOT_ELEMENT: &str = "streams";
const STREAM_ELEMENT: &str = "stream";

/// Loads and validates stream manifests.
#[derive(Debug, Clone)]
pub struct StreamLoader {
    known_streams: BTreeSet<String>,
}

impl Default for StreamLoader {
    fn default() -> Self {
        Self {
            known_streams: DEFAULT_KNOWN_STREAMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StreamLoader {
    /// A loader that accepts only references to streams in the same file.
    pub fn without_known_streams() -> Self {
        Self {
            known_streams: BTreeSet::new(),
        }
    }

    /// Add predeclared stream names that embedded references may use.
    pub fn with_known_streams<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_streams.extend(names.into_iter().map(Into::into));
        self
    }

    /// Predeclared stream names, in sorted order.
    pub fn known_streams(&self) -> impl Iterator<Item = &str> {
        self.known_streams.iter().map(String::as_str)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_streams.contains(name)
    }

    /// Read and validate a manifest file.
    pub fn load(&self, path: &Path) -> ManifestResult<StreamManifest> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ManifestError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let malformed = |reason: MalformedManifest| ManifestError::Malformed {
            origin: path.display().to_string(),
            reason,
        };
        let text = String::from_utf8(bytes).map_err(|e| {
            malformed(MalformedManifest::Xml {
                position: e.utf8_error().valid_up_to() as u64,
                detail: "text is not valid UTF-8".to_string(),
            })
        })?;
        let manifest = self.parse(&text).map_err(malformed)?;
        tracing::debug!(
            path = %path.display(),
            streams = manifest.len(),
            "loaded stream manifest"
        );
        Ok(manifest)
    }

    /// Parse and validate manifest text.
    pub fn parse(&self, text: &str) -> Result<StreamManifest, MalformedManifest> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut builder = Builder::default();
        loop {
            let event = reader.read_event().map_err(|e| MalformedManifest::Xml {
                position: reader.buffer_position() as u64,
                detail: e.to_string(),
            })?;
            match event {
                Event::Start(e) => builder.open(&e, false)?,
                Event::Empty(e) => builder.open(&e, true)?,
                Event::End(_) => builder.close(reader.buffer_position() as u64)?,
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| MalformedManifest::Xml {
                        position: reader.buffer_position() as u64,
                        detail: e.to_string(),
                    })?;
                    builder.text(&text)?;
                }
                Event::CData(t) => {
                    builder.text(&String::from_utf8_lossy(&t))?;
                }
                Event::Eof => break,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
        let manifest = builder.finish(reader.buffer_position() as u64)?;

        resolve::check_references(&manifest, |name| self.is_known(name))?;
        Ok(manifest)
    }
}

impl FromStr for StreamManifest {
    type Err = MalformedManifest;

    /// Parse with the default set of predeclared streams.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamLoader::default().parse(s)
    }
}

// ---------------------------------------------------------------------------
// Document walk
// ---------------------------------------------------------------------------

enum State {
    /// Before `<streams>`.
    Prolog,
    /// Inside `<streams>`, between stream declarations.
    Root,
    /// Inside a `<stream>` declaration.
    Stream(Stream),
    /// Inside a non-empty content element of a stream.
    Entry(Stream, &'static str),
    /// After `</streams>`.
    Done,
}

struct Builder {
    state: State,
    manifest: StreamManifest,
    entries: HashSet<StreamEntry>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            state: State::Prolog,
            manifest: StreamManifest::new(),
            entries: HashSet::new(),
        }
    }
}

impl Builder {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), MalformedManifest> {
        let element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let state = std::mem::replace(&mut self.state, State::Done);
        self.state = match state {
            State::Prolog => {
                if element != ROOT_ELEMENT {
                    return Err(MalformedManifest::MissingRoot { found: element });
                }
                if empty {
                    State::Done
                } else {
                    State::Root
                }
            }
            State::Root => {
                if element != STREAM_ELEMENT {
                    return Err(MalformedManifest::UnexpectedElement {
                        element,
                        parent: format!("<{ROOT_ELEMENT}>"),
                    });
                }
                let stream = stream_from_attributes(&attributes(e)?)?;
                if self.manifest.contains(&stream.name) {
                    return Err(MalformedManifest::DuplicateStream { name: stream.name });
                }
                if empty {
                    self.manifest.push(stream);
                    State::Root
                } else {
                    self.entries.clear();
                    State::Stream(stream)
                }
            }
            State::Stream(mut stream) => {
                let entry = self.entry(&element, &stream.name, e)?;
                let tag = entry.element();
                if !self.entries.insert(entry.clone()) {
                    return Err(MalformedManifest::DuplicateEntry {
                        stream: stream.name,
                        entry: entry.to_string(),
                    });
                }
                stream.contents.push(entry);
                if empty {
                    State::Stream(stream)
                } else {
                    State::Entry(stream, tag)
                }
            }
            State::Entry(stream, tag) => {
                return Err(MalformedManifest::UnexpectedElement {
                    element,
                    parent: format!("<{tag}> in stream '{}'", stream.name),
                });
            }
            State::Done => {
                return Err(MalformedManifest::UnexpectedElement {
                    element,
                    parent: "the end of the document".to_string(),
                });
            }
        };
        Ok(())
    }

    fn entry(
        &self,
        element: &str,
        stream: &str,
        e: &BytesStart<'_>,
    ) -> Result<StreamEntry, MalformedManifest> {
        let mut name = None;
        for (key, value) in attributes(e)? {
            if key == "name" {
                name = Some(value);
            } else {
                tracing::warn!(
                    stream,
                    element,
                    attribute = %key,
                    "ignoring unsupported attribute on stream entry"
                );
            }
        }
        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| MalformedManifest::MissingAttribute {
                element: element.to_string(),
                stream: Some(stream.to_string()),
                attribute: "name",
            })?;
        StreamEntry::from_element(element, name).ok_or_else(|| {
            MalformedManifest::UnexpectedElement {
                element: element.to_string(),
                parent: format!("stream '{stream}'"),
            }
        })
    }

    fn close(&mut self, position: u64) -> Result<(), MalformedManifest> {
        let state = std::mem::replace(&mut self.state, State::Done);
        self.state = match state {
            State::Root => State::Done,
            State::Stream(stream) => {
                self.manifest.push(stream);
                State::Root
            }
            State::Entry(stream, _) => State::Stream(stream),
            State::Prolog | State::Done => {
                return Err(MalformedManifest::Xml {
                    position,
                    detail: "closing tag without a matching opening tag".to_string(),
                });
            }
        };
        Ok(())
    }

    fn text(&self, text: &str) -> Result<(), MalformedManifest> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let parent = match &self.state {
            State::Prolog | State::Done => "the document".to_string(),
            State::Root => format!("<{ROOT_ELEMENT}>"),
            State::Stream(stream) => format!("stream '{}'", stream.name),
            State::Entry(stream, tag) => format!("<{tag}> in stream '{}'", stream.name),
        };
        Err(MalformedManifest::UnexpectedText {
            parent,
            text: text.trim().to_string(),
        })
    }

    fn finish(self, position: u64) -> Result<StreamManifest, MalformedManifest> {
        match self.state {
            State::Done => Ok(self.manifest),
            State::Prolog => Err(MalformedManifest::MissingRoot {
                found: "an empty document".to_string(),
            }),
            State::Root | State::Stream(_) | State::Entry(..) => Err(MalformedManifest::Xml {
                position,
                detail: "document ends before all elements are closed".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, MalformedManifest> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MalformedManifest::Xml {
            position: 0,
            detail: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| MalformedManifest::Xml {
                position: 0,
                detail: err.to_string(),
            })?
            .into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn take(attrs: &mut Vec<(String, String)>, key: &str) -> Option<String> {
    let idx = attrs.iter().position(|(k, _)| k == key)?;
    Some(attrs.remove(idx).1)
}

fn stream_from_attributes(attrs: &[(String, String)]) -> Result<Stream, MalformedManifest> {
    let mut attrs = attrs.to_vec();

    let name = take(&mut attrs, "name")
        .filter(|n| !n.trim().is_empty())
        .ok_or(MalformedManifest::MissingAttribute {
            element: STREAM_ELEMENT.to_string(),
            stream: None,
            attribute: "name",
        })?;
    let missing = |attribute: &'static str| MalformedManifest::MissingAttribute {
        element: STREAM_ELEMENT.to_string(),
        stream: Some(name.clone()),
        attribute,
    };
    let invalid = |attribute: &str, value: String, expected: &'static str| {
        MalformedManifest::InvalidAttribute {
            stream: name.clone(),
            attribute: attribute.to_string(),
            value,
            expected,
        }
    };

    let raw_type = take(&mut attrs, "type").ok_or_else(|| missing("type"))?;
    let stream_type = raw_type
        .parse::<StreamType>()
        .map_err(|()| invalid("type", raw_type.clone(), "stream type"))?;

    let filename_template = FilenameTemplate::new(
        take(&mut attrs, "filename_template").ok_or_else(|| missing("filename_template"))?,
    );
    if filename_template.is_blank() {
        return Err(MalformedManifest::EmptyFilenameTemplate {
            stream: name.clone(),
        });
    }

    let input_interval = take(&mut attrs, "input_interval").map(|v| Interval::parse(&v));
    let output_interval = take(&mut attrs, "output_interval").map(|v| Interval::parse(&v));
    let mismatch = |attribute: &'static str| MalformedManifest::IntervalMismatch {
        stream: name.clone(),
        stream_type,
        attribute,
    };
    if input_interval.is_some() && !stream_type.is_input() {
        return Err(mismatch("input_interval"));
    }
    if output_interval.is_some() && !stream_type.is_output() {
        return Err(mismatch("output_interval"));
    }

    let reference_time = match take(&mut attrs, "reference_time") {
        Some(raw) => Some(
            raw.parse::<ModelTimestamp>()
                .map_err(|_| invalid("reference_time", raw.clone(), "model timestamp"))?,
        ),
        None => None,
    };
    let clobber_mode = match take(&mut attrs, "clobber_mode") {
        Some(raw) => Some(
            raw.parse::<ClobberMode>()
                .map_err(|()| invalid("clobber_mode", raw.clone(), "clobber mode"))?,
        ),
        None => None,
    };

    Ok(Stream {
        name,
        stream_type,
        filename_template,
        input_interval,
        output_interval,
        reference_time,
        clobber_mode,
        attributes: attrs,
        contents: Vec::new(),
    })
}
