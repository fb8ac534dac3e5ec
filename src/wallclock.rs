//! Wall-clock time model.
//!
//! Every timestamp in calgrid is a local wall-clock value: the literal
//! hour and minute the user typed, with no timezone attached. Values are
//! stored as [`chrono::NaiveDateTime`] and are never routed through UTC,
//! so the displayed hour cannot drift with the host's offset.
//!
//! The persisted string format is `YYYY-MM-DDTHH:MM:SS`.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Serialization format for composite wall-clock values.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_LEN: usize = 10;

/// A local date-time with no timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallClock(NaiveDateTime);

impl WallClock {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Build a value from a date and an optional time; `None` means midnight.
    pub fn from_parts(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self(date.and_time(time.unwrap_or(NaiveTime::MIN)))
    }

    /// Parse a composite wall-clock string.
    ///
    /// Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DDTHH:MM`, a space in place of
    /// `T`, fractional seconds, and a bare `YYYY-MM-DD` (midnight). A trailing
    /// `Z` or `+HH:MM` offset is discarded and the written hour is kept as is.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }

        let invalid = || ParseError::InvalidTimestamp(raw.to_string());

        let date_part = raw.get(..DATE_LEN).ok_or_else(invalid)?;
        let date = parse_date(date_part).map_err(|_| invalid())?;

        let rest = &raw[DATE_LEN..];
        if rest.is_empty() {
            return Ok(Self::from_parts(date, None));
        }

        let mut chars = rest.chars();
        match chars.next() {
            Some('T') | Some('t') | Some(' ') => {}
            _ => return Err(invalid()),
        }

        let time_part = strip_offset(chars.as_str());
        let time = parse_clock(time_part).ok_or_else(invalid)?;
        Ok(Self(date.and_time(time)))
    }

    pub fn naive(self) -> NaiveDateTime {
        self.0
    }

    pub fn date(self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(self) -> NaiveTime {
        self.0.time()
    }

    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    /// True iff hour, minute and second are all zero.
    pub fn is_all_day(self) -> bool {
        is_midnight(self.0)
    }

    /// Split back into the date part and the optional time part.
    ///
    /// Midnight yields `None`, matching [`WallClock::is_all_day`].
    pub fn split(self) -> (NaiveDate, Option<NaiveTime>) {
        if self.is_all_day() {
            (self.date(), None)
        } else {
            (self.date(), Some(self.time()))
        }
    }

    /// Attach a host offset without moving the displayed hour.
    pub fn in_zone(self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        offset.from_local_datetime(&self.0).single()
    }

    /// Recover the wall-clock value of a zoned timestamp, as displayed in its own zone.
    pub fn from_zoned<Tz: TimeZone>(value: &DateTime<Tz>) -> Self {
        Self(value.naive_local())
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WALL_CLOCK_FORMAT))
    }
}

impl FromStr for WallClock {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        WallClock::parse(s)
    }
}

impl From<NaiveDateTime> for WallClock {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl Serialize for WallClock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallClock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        WallClock::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Compose a date part and an optional `HH:MM` time part into a wall-clock string.
///
/// `("2026-02-04", Some("14:00"))` becomes `"2026-02-04T14:00:00"`; a missing
/// time yields midnight, which reads back as all-day.
pub fn compose(date: &str, time: Option<&str>) -> Result<String, ParseError> {
    let date = parse_date(date)?;
    let time = time.map(parse_time).transpose()?;
    Ok(WallClock::from_parts(date, time).to_string())
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }
    let bytes = raw.as_bytes();
    if bytes.len() != DATE_LEN || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(ParseError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ParseError::InvalidDate(raw.to_string()))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) time of day.
pub fn parse_time(input: &str) -> Result<NaiveTime, ParseError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }
    parse_clock(raw).ok_or_else(|| ParseError::InvalidTime(raw.to_string()))
}

/// Midnight at the start of `value`'s day.
pub fn start_of_day(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(NaiveTime::MIN)
}

/// Midnight at the start of the following day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::days(1)
}

pub fn is_midnight(value: NaiveDateTime) -> bool {
    value.hour() == 0 && value.minute() == 0 && value.second() == 0
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let bytes = raw.as_bytes();
    if bytes.len() < 5 || bytes[2] != b':' {
        return None;
    }
    if bytes.len() == 5 {
        return NaiveTime::parse_from_str(raw, "%H:%M").ok();
    }
    if bytes[5] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f").ok()
}

fn strip_offset(time: &str) -> &str {
    if let Some(stripped) = time.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return stripped;
    }
    match time.find(|c: char| c == '+' || c == '-') {
        Some(pos) => &time[..pos],
        None => time,
    }
}
