//! Time helpers — wall-clock access and time-of-day values.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};

use crate::error::ValidationError;

/// Local wall-clock reading used for schedule checks.
pub type Timestamp = NaiveDateTime;

/// Return the current local time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now().naive_local()
}

/// A minute-resolution time of day (`HH:MM`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Number of distinct minute-resolution times in a day.
    pub const MINUTES_PER_DAY: i64 = 24 * 60;

    /// Build from hour and minute, `None` when out of range.
    #[must_use]
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Build from minutes since midnight, `None` when out of range.
    #[must_use]
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        if !(0..Self::MINUTES_PER_DAY).contains(&minutes) {
            return None;
        }
        let minutes = u32::try_from(minutes).ok()?;
        Self::from_hm(minutes / 60, minutes % 60)
    }

    /// Minutes since midnight.
    #[must_use]
    pub fn minutes(self) -> i64 {
        i64::from(self.0.hour() * 60 + self.0.minute())
    }

    /// The moment this time of day falls on the same date as `at`.
    #[must_use]
    pub fn on_same_day(self, at: Timestamp) -> Timestamp {
        at.date().and_time(self.0)
    }
}

/// Accepts `H:M`, `HH:M`, `H:MM` and `HH:MM`; short parts are zero-padded.
impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
        let short =
            |part: &str| !part.is_empty() && part.len() <= 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !short(hours) || !short(minutes) {
            return Err(invalid());
        }
        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        Self::from_hm(hours, minutes).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}
