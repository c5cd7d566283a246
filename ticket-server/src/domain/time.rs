//! Clock-of-day handling for ticket data.
//!
//! The ticket provider reports departure and arrival times as bare "HH:MM"
//! strings with no date attached. This module provides a date-less clock
//! type plus the two kinds of minute arithmetic the rest of the crate
//! needs: absolute difference (for approximate-time windows) and forward
//! difference with overnight wrap (for transfer continuity).

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Minutes in a day.
const DAY_MINS: i64 = 24 * 60;

/// Error returned when parsing an invalid clock string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time: {reason}")]
pub struct ClockError {
    reason: &'static str,
}

impl ClockError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A clock time of day, minute precision, no date.
///
/// # Examples
///
/// ```
/// use ticket_server::domain::ClockTime;
///
/// let t = ClockTime::parse("09:30").unwrap();
/// assert_eq!(t.to_string(), "09:30");
///
/// // Single-digit hours are accepted (shorthand input allows them)
/// let t = ClockTime::parse("9:05").unwrap();
/// assert_eq!(t.to_string(), "09:05");
///
/// assert!(ClockTime::parse("24:00").is_err());
/// assert!(ClockTime::parse("0930").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Create a clock time from components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ClockError> {
        if hour > 23 {
            return Err(ClockError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(ClockError::new("minute must be 0-59"));
        }
        Ok(Self { hour, minute })
    }

    /// Parse "H:MM" or "HH:MM".
    pub fn parse(s: &str) -> Result<Self, ClockError> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| ClockError::new("expected HH:MM format"))?;

        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(ClockError::new("expected HH:MM format"));
        }

        let hour: u8 = h
            .parse()
            .map_err(|_| ClockError::new("invalid hour digits"))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| ClockError::new("invalid minute digits"))?;

        Self::new(hour, minute)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight (0..1440).
    pub fn minute_of_day(&self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    /// Absolute difference in minutes, without day wraparound.
    ///
    /// Used for approximate-time windows: "around 10:00" means the plain
    /// distance on the clock face of one day, so 23:50 is 590 minutes from
    /// 00:10, not 20.
    pub fn abs_diff_minutes(&self, other: ClockTime) -> i64 {
        (self.minute_of_day() - other.minute_of_day()).abs()
    }

    /// Signed difference `self - other` in minutes, no wraparound.
    pub fn signed_diff_minutes(&self, other: ClockTime) -> i64 {
        self.minute_of_day() - other.minute_of_day()
    }

    /// Minutes from `other` forward to `self`, wrapping past midnight.
    ///
    /// A second leg departing 00:20 after a first leg arriving 23:50 is 30
    /// minutes later (overnight continuation), not -1410.
    pub fn minutes_since(&self, other: ClockTime) -> i64 {
        let diff = self.minute_of_day() - other.minute_of_day();
        if diff < 0 { diff + DAY_MINS } else { diff }
    }
}

impl Ord for ClockTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.minute_of_day().cmp(&other.minute_of_day())
    }
}

impl PartialOrd for ClockTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour, self.minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
