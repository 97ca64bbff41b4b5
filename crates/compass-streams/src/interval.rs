//! Stream cadence: the value of `input_interval` / `output_interval`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time::ModelDuration;

/// How often a stream is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Interval {
    /// `none`: the stream is never read or written automatically.
    None,
    /// `initial_only`: once, at the start of the run.
    InitialOnly,
    /// A fixed period of model time.
    Every(ModelDuration),
    /// A symbolic value resolved by the model at run time, such as a
    /// namelist reference. Kept verbatim.
    Other(String),
}

impl Interval {
    /// Interpret attribute text. Anything that is neither a keyword nor a
    /// duration becomes [`Interval::Other`].
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            "none" => Self::None,
            "initial_only" => Self::InitialOnly,
            _ => match text.parse::<ModelDuration>() {
                Ok(duration) => Self::Every(duration),
                Err(()) => Self::Other(text.to_string()),
            },
        }
    }

    /// The period, if this is a fixed cadence.
    pub fn period(&self) -> Option<&ModelDuration> {
        match self {
            Self::Every(duration) => Some(duration),
            _ => None,
        }
    }
}

impl FromStr for Interval {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::InitialOnly => f.write_str("initial_only"),
            Self::Every(duration) => write!(f, "{duration}"),
            Self::Other(text) => f.write_str(text),
        }
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}
