//! "HH:MM" time-of-day text and the slot types built on it.

use crate::error::ValidationError;
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TIME_FORMAT: &str = "%H:%M";
const STORED_TIME_FORMAT: &str = "%H:%M:%S";

/// Parses a 24-hour "HH:MM" value.
pub fn parse_hhmm(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::new(format!("invalid time '{input}' (expected HH:MM)")))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parses a stored time column, which may carry seconds ("HH:MM:SS").
pub fn parse_stored_time(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), STORED_TIME_FORMAT).or_else(|_| parse_hhmm(input))
}

pub fn format_stored_time(time: NaiveTime) -> String {
    time.format(STORED_TIME_FORMAT).to_string()
}

/// A working period within one day. `end` before `start` means the slot runs
/// past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SlotText", try_from = "SlotText")]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start_time = parse_hhmm(start)
            .map_err(|_| ValidationError::new(format!("invalid start time '{start}'")))?;
        let end_time = parse_hhmm(end)
            .map_err(|_| ValidationError::new(format!("invalid end time '{end}'")))?;
        Ok(Self::new(start_time, end_time))
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Elapsed time, never negative.
    pub fn duration(&self) -> Duration {
        let elapsed = self.end.signed_duration_since(self.start);
        if self.crosses_midnight() {
            elapsed + Duration::hours(24)
        } else {
            elapsed
        }
    }

    pub fn to_text(&self) -> SlotText {
        SlotText::new(format_hhmm(self.start), format_hhmm(self.end))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Wire form of a slot: `{"start": "HH:MM", "end": "HH:MM"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotText {
    pub start: String,
    pub end: String,
}

impl SlotText {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn parse(&self) -> Result<TimeSlot, ValidationError> {
        TimeSlot::parse(&self.start, &self.end)
    }
}

impl From<TimeSlot> for SlotText {
    fn from(slot: TimeSlot) -> Self {
        slot.to_text()
    }
}

impl TryFrom<SlotText> for TimeSlot {
    type Error = ValidationError;

    fn try_from(text: SlotText) -> Result<Self, Self::Error> {
        text.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_and_formats_zero_padded() {
        assert_eq!(parse_hhmm("07:05").unwrap(), t(7, 5));
        assert_eq!(format_hhmm(t(7, 5)), "07:05");
    }

    #[test]
    fn rejects_out_of_range_hours() {
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("noon").is_err());
    }

    #[test]
    fn stored_time_accepts_seconds() {
        assert_eq!(parse_stored_time("13:45:00").unwrap(), t(13, 45));
        assert_eq!(parse_stored_time("13:45").unwrap(), t(13, 45));
        assert_eq!(format_stored_time(t(13, 45)), "13:45:00");
    }

    #[test]
    fn midnight_crossing_duration() {
        let slot = TimeSlot::new(t(22, 0), t(2, 0));
        assert!(slot.crosses_midnight());
        assert_eq!(slot.duration(), Duration::hours(4));
    }

    #[test]
    fn serializes_as_text_pair() {
        let slot = TimeSlot::new(t(9, 0), t(12, 30));
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"start":"09:00","end":"12:30"}"#);
        let back: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }
}
