//! Time values carried by raw input and produced by time coercion.
//!
//! Every absolute time is held as `DateTime<FixedOffset>`. Inputs without a
//! zone (dates, naive date-times, wire date-times, zone-less strings) are
//! taken as UTC.

use crate::Error;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display format for absolute times: `2007-11-01 15:25:00 +0000`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Compact ISO 8601 form used by XML-RPC style wire protocols.
const WIRE_FORMAT: &str = "%Y%m%dT%H:%M:%S";

const ZONED_FORMATS: &[&str] = &[TIME_FORMAT, "%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%dT%H:%M:%S%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    WIRE_FORMAT,
];

/// The Unix epoch as an absolute time.
#[must_use]
pub fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::default().fixed_offset()
}

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn date_to_time(date: NaiveDate) -> DateTime<FixedOffset> {
    naive_to_time(date.and_time(NaiveTime::MIN))
}

/// Interprets a zone-less date-time as UTC.
#[must_use]
pub fn naive_to_time(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

/// Formats an absolute time as `YYYY-MM-DD HH:MM:SS +HHMM`.
#[must_use]
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parses a string into an absolute time.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS +HHMM` (the form
/// [`format_time`] writes), zone-less date-times and bare dates. Returns
/// `None` for anything else.
#[must_use]
pub fn parse_time(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Some(time);
    }
    if let Ok(time) = DateTime::parse_from_rfc2822(input) {
        return Some(time);
    }
    for format in ZONED_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(input, format) {
            return Some(time);
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive_to_time(naive));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(date_to_time)
}

/// A date-time as carried by XML-RPC style wire protocols.
///
/// It has no zone and no sub-second part; [`WireDateTime::to_time`] reads it
/// as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WireDateTime(NaiveDateTime);

impl WireDateTime {
    /// Creates a wire date-time from its components.
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> crate::Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Self)
            .ok_or_else(|| {
                Error::InvalidWireDateTime(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                ))
            })
    }

    /// Parses the compact `YYYYMMDDTHH:MM:SS` form or `YYYY-MM-DDTHH:MM:SS`.
    pub fn parse(s: &str) -> crate::Result<Self> {
        NaiveDateTime::parse_from_str(s, WIRE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .map(Self)
            .map_err(|_| Error::InvalidWireDateTime(s.to_string()))
    }

    /// Returns the zone-less date-time.
    #[must_use]
    pub const fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Converts to an absolute time, reading the value as UTC.
    #[must_use]
    pub fn to_time(&self) -> DateTime<FixedOffset> {
        naive_to_time(self.0)
    }
}

impl fmt::Display for WireDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for WireDateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WireDateTime {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<WireDateTime> for String {
    fn from(wire: WireDateTime) -> Self {
        wire.to_string()
    }
}

impl From<NaiveDateTime> for WireDateTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self(naive.with_nanosecond(0).unwrap_or(naive))
    }
}
