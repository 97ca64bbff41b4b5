//! # Model Time Values
//!
//! Stream attributes use the model's time notation:
//!
//! - timestamps: `YYYY-MM-DD_hh:mm:ss` (e.g. `0001-01-01_00:00:00`), with the
//!   time part optional;
//! - durations: `[[[Y-]M-]D_]h:m:s` style intervals, e.g.
//!   `0000-00-00_01:00:00` (one hour) or `1_00:00:00` (one day). Calendar
//!   fields are kept separately since month length depends on the calendar.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// A point in model time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelTimestamp(NaiveDateTime);

/// The text is not a `YYYY-MM-DD[_hh:mm:ss]` timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimestamp(pub String);

impl fmt::Display for InvalidTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid model timestamp {:?}", self.0)
    }
}

impl std::error::Error for InvalidTimestamp {}

impl ModelTimestamp {
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Day of the year, starting at 1.
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }
}

impl FromStr for ModelTimestamp {
    type Err = InvalidTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
            return Ok(Self(dt));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
            .ok_or_else(|| InvalidTimestamp(s.to_string()))
    }
}

impl fmt::Display for ModelTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}_{:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl Serialize for ModelTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModelTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// A span of model time, field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelDuration {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ModelDuration {
    /// Whether every field is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Length in seconds, if the duration has no calendar (year/month) part.
    pub fn fixed_seconds(&self) -> Option<u64> {
        if self.years != 0 || self.months != 0 {
            return None;
        }
        Some(
            u64::from(self.days) * 86_400
                + u64::from(self.hours) * 3_600
                + u64::from(self.minutes) * 60
                + u64::from(self.seconds),
        )
    }
}

fn parse_fields(text: &str, sep: char) -> Option<Vec<u32>> {
    text.split(sep)
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                part.parse().ok()
            }
        })
        .collect()
}

impl FromStr for ModelDuration {
    type Err = ();

    /// Date fields fill from the right (`D`, `M-D`, `Y-M-D`), as do time
    /// fields (`s`, `m:s`, `h:m:s`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (date, time) = match s.split_once('_') {
            Some((date, time)) => (Some(date), Some(time)),
            None if s.contains(':') => (None, Some(s)),
            None if s.contains('-') => (Some(s), None),
            None => return Err(()),
        };

        let mut duration = Self::default();
        if let Some(date) = date {
            let fields = parse_fields(date, '-').ok_or(())?;
            match fields.as_slice() {
                [d] => duration.days = *d,
                [m, d] => (duration.months, duration.days) = (*m, *d),
                [y, m, d] => (duration.years, duration.months, duration.days) = (*y, *m, *d),
                _ => return Err(()),
            }
        }
        if let Some(time) = time {
            let fields = parse_fields(time, ':').ok_or(())?;
            match fields.as_slice() {
                [sec] => duration.seconds = *sec,
                [m, sec] => (duration.minutes, duration.seconds) = (*m, *sec),
                [h, m, sec] => {
                    (duration.hours, duration.minutes, duration.seconds) = (*h, *m, *sec)
                }
                _ => return Err(()),
            }
        }
        Ok(duration)
    }
}

impl fmt::Display for ModelDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}_{:02}:{:02}:{:02}",
            self.years, self.months, self.days, self.hours, self.minutes, self.seconds
        )
    }
}
