//! # Config Documents
//!
//! A [`ConfigDocument`] is the parsed form of one or more INI-style config
//! files:
//!
//! ```text
//! # comment
//! [mesh]
//! levels = 5
//! cull_distance: 70.0
//! description = first line
//!     continued on an indented line
//! ```
//!
//! ## Rules
//!
//! - Option names are case-insensitive and stored in lower case. Section
//!   names are case-sensitive.
//! - `=` and `:` both separate a name from its value. Whitespace around
//!   both is stripped.
//! - Lines starting with `#` or `;` (after indentation) are comments.
//! - An indented line directly following an option continues its value.
//! - Options in `[DEFAULT]` are visible from every section.
//! - Within one file a section or option may appear only once. Across
//!   layered files, later values replace earlier ones.
//!
//! Values are kept as raw text; [`ConfigDocument::get`] expands `${...}`
//! references and [`ConfigDocument::get_as`] coerces to a typed value.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult, MalformedConfig};
use crate::interpolate;
use crate::value::ConfigValue;

/// Name of the section whose options every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Normalize an option name the way lookups expect it.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One `[name]` block: an ordered list of options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// The section name, as written in its header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value of an option declared in this section.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = normalize_key(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether the option is declared in this section.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set an option, keeping its position if it already exists.
    ///
    /// Returns the previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        let key = normalize_key(key);
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove an option, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key = normalize_key(key);
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Option names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Target {
    Defaults,
    Section(usize),
}

/// A parsed config file, or the combination of several layered ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    defaults: Section,
    sections: Vec<Section>,
    sources: Vec<PathBuf>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Parse config text.
    pub fn parse(text: &str) -> Result<Self, MalformedConfig> {
        let mut doc = Self::new();
        let mut seen_sections: HashSet<String> = HashSet::new();
        let mut current: Option<Target> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if raw_line.starts_with([' ', '\t']) {
                if let (Some(target), Some(key)) = (current, last_key.as_deref()) {
                    if let Some(value) = doc.target_mut(target).get_mut(key) {
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| MalformedConfig::Syntax {
                        line,
                        detail: format!("unterminated section header {trimmed:?}"),
                    })?
                    .trim();
                if name.is_empty() {
                    return Err(MalformedConfig::Syntax {
                        line,
                        detail: "empty section name".to_string(),
                    });
                }
                if !seen_sections.insert(name.to_string()) {
                    return Err(MalformedConfig::DuplicateSection {
                        section: name.to_string(),
                        line,
                    });
                }
                current = Some(if name == DEFAULT_SECTION {
                    Target::Defaults
                } else {
                    doc.sections.push(Section::new(name));
                    Target::Section(doc.sections.len() - 1)
                });
                last_key = None;
                continue;
            }

            let Some(target) = current else {
                return Err(MalformedConfig::Syntax {
                    line,
                    detail: "option appears before any section header".to_string(),
                });
            };
            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(MalformedConfig::Syntax {
                    line,
                    detail: format!("expected `name = value`, found {trimmed:?}"),
                });
            };
            let key = normalize_key(&trimmed[..split]);
            if key.is_empty() {
                return Err(MalformedConfig::Syntax {
                    line,
                    detail: "missing option name".to_string(),
                });
            }
            let value = trimmed[split + 1..].trim().to_string();

            let section = doc.target_mut(target);
            if section.contains(&key) {
                return Err(MalformedConfig::DuplicateOption {
                    section: section.name.clone(),
                    key,
                    line,
                });
            }
            section.entries.push((key.clone(), value));
            last_key = Some(key);
        }

        Ok(doc)
    }

    /// Read and parse one config file.
    pub fn read(path: &Path) -> ConfigResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let malformed =
            |reason: MalformedConfig| ConfigError::malformed(path.display().to_string(), reason);
        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            malformed(MalformedConfig::Syntax {
                line: valid.iter().filter(|b| **b == b'\n').count() + 1,
                detail: "text is not valid UTF-8".to_string(),
            })
        })?;
        let mut doc = Self::parse(&text).map_err(malformed)?;
        doc.sources.push(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            sections = doc.sections.len(),
            "read config file"
        );
        Ok(doc)
    }

    /// Read several config files in order, later files overriding earlier ones.
    pub fn read_layered<P: AsRef<Path>>(paths: &[P]) -> ConfigResult<Self> {
        let mut doc = Self::new();
        for path in paths {
            doc.merge(Self::read(path.as_ref())?);
        }
        Ok(doc)
    }

    /// Layer `other` on top of this document.
    pub fn merge(&mut self, other: ConfigDocument) {
        for (key, value) in other.defaults.entries {
            self.defaults.set(&key, value);
        }
        for section in other.sections {
            let target = self.section_entry(&section.name);
            for (key, value) in section.entries {
                if let Some(previous) = target.set(&key, value) {
                    tracing::trace!(section = %section.name, %key, %previous, "overridden");
                }
            }
        }
        self.sources.extend(other.sources);
    }

    /// Files this document was read from, in layering order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Human-readable description of where this document came from.
    pub fn origin(&self) -> String {
        if self.sources.is_empty() {
            "<memory>".to_string()
        } else {
            self.sources
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// Wrap a malformation with this document's origin.
    pub fn malformed(&self, reason: MalformedConfig) -> ConfigError {
        ConfigError::malformed(self.origin(), reason)
    }

    /// Look up a section by name. `DEFAULT` returns the defaults.
    pub fn section(&self, name: &str) -> Option<&Section> {
        if name == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections.iter().find(|s| s.name == name)
    }

    /// Whether the section exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Sections other than `[DEFAULT]`, in order of first appearance.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Mutable access to a section, creating it if needed.
    pub fn section_entry(&mut self, name: &str) -> &mut Section {
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        let idx = match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    /// Set a raw option value, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_entry(section).set(key, value);
    }

    /// Raw option text, falling back to `[DEFAULT]`.
    pub fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)
            .and_then(|s| s.get(key))
            .or_else(|| self.defaults.get(key))
    }

    /// Option value with `${...}` references expanded.
    pub fn get(&self, section: &str, key: &str) -> Result<String, MalformedConfig> {
        if !self.has_section(section) {
            return Err(MalformedConfig::MissingSection {
                section: section.to_string(),
            });
        }
        let key = normalize_key(key);
        let raw = self
            .raw(section, &key)
            .ok_or_else(|| MalformedConfig::MissingOption {
                section: section.to_string(),
                key: key.clone(),
            })?;
        interpolate::expand(self, section, &key, raw)
    }

    /// Option value coerced to `T`.
    pub fn get_as<T: ConfigValue>(&self, section: &str, key: &str) -> Result<T, MalformedConfig> {
        let value = self.get(section, key)?;
        T::coerce(&value).ok_or_else(|| MalformedConfig::InvalidValue {
            section: section.to_string(),
            key: normalize_key(key),
            value,
            expected: T::EXPECTED,
        })
    }

    fn target_mut(&mut self, target: Target) -> &mut Section {
        match target {
            Target::Defaults => &mut self.defaults,
            Target::Section(idx) => &mut self.sections[idx],
        }
    }
}

impl FromStr for ConfigDocument {
    type Err = MalformedConfig;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfigDocument {
    /// Writes the document back as config text. Multi-line values are written
    /// with tab-indented continuation lines; comments are not preserved.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let sections = std::iter::once(&self.defaults)
            .filter(|s| !s.is_empty())
            .chain(self.sections.iter());
        for section in sections {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in section.iter() {
                let mut lines = value.split('\n');
                writeln!(f, "{key} = {}", lines.next().unwrap_or_default())?;
                for continuation in lines {
                    writeln!(f, "\t{continuation}")?;
                }
            }
        }
        Ok(())
    }
}
