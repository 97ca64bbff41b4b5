//! # Filename Templates
//!
//! A stream's `filename_template` names the file it reads or writes. Time
//! placeholders let one stream span many files:
//!
//! | placeholder | expands to |
//! |---|---|
//! | `$Y` | year, 4 digits |
//! | `$M` | month, 2 digits |
//! | `$D` | day of month, 2 digits |
//! | `$d` | day of year, 3 digits |
//! | `$h` | hour, 2 digits |
//! | `$m` | minute, 2 digits |
//! | `$s` | second, 2 digits |
//!
//! A `$` followed by any other character is literal text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::ModelTimestamp;

/// A time field substituted into a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Year,
    Month,
    Day,
    DayOfYear,
    Hour,
    Minute,
    Second,
}

impl Placeholder {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'Y' => Self::Year,
            'M' => Self::Month,
            'D' => Self::Day,
            'd' => Self::DayOfYear,
            'h' => Self::Hour,
            'm' => Self::Minute,
            's' => Self::Second,
            _ => return None,
        })
    }

    fn render(self, at: &ModelTimestamp) -> String {
        match self {
            Self::Year => format!("{:04}", at.year()),
            Self::Month => format!("{:02}", at.month()),
            Self::Day => format!("{:02}", at.day()),
            Self::DayOfYear => format!("{:03}", at.day_of_year()),
            Self::Hour => format!("{:02}", at.hour()),
            Self::Minute => format!("{:02}", at.minute()),
            Self::Second => format!("{:02}", at.second()),
        }
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(Placeholder),
}

/// The `filename_template` of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the template is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Split the template into literal text and placeholders.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let text = self.0.as_str();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut chars = text.char_indices().peekable();
        while let Some((idx, c)) = chars.next() {
            if c != '$' {
                continue;
            }
            let Some(&(_, next)) = chars.peek() else {
                break;
            };
            if let Some(placeholder) = Placeholder::from_char(next) {
                if literal_start < idx {
                    segments.push(Segment::Literal(&text[literal_start..idx]));
                }
                segments.push(Segment::Placeholder(placeholder));
                chars.next();
                literal_start = idx + 2;
            }
        }
        if literal_start < text.len() {
            segments.push(Segment::Literal(&text[literal_start..]));
        }
        segments
    }

    /// The placeholders used, in order of appearance.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.segments()
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(p) => Some(p),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Whether the filename changes with model time.
    pub fn is_time_varying(&self) -> bool {
        !self.placeholders().is_empty()
    }

    /// The filename for a given model time.
    pub fn expand(&self, at: &ModelTimestamp) -> String {
        self.segments()
            .into_iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.to_string(),
                Segment::Placeholder(p) => p.render(at),
            })
            .collect()
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
