// libs/shared/models/src/clock.rs
//
// Wall-clock times at minute granularity. The clinic runs in a single local
// timezone, so there is no zone or DST handling here.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed time '{input}', expected HH:MM")]
pub struct MalformedTimeError {
    pub input: String,
}

impl MalformedTimeError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Minute of the day, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// `None` once the result would run past the end of the day.
    pub fn checked_add_minutes(self, minutes: u16) -> Option<Self> {
        self.0.checked_add(minutes).and_then(Self::from_minutes)
    }

    pub fn parse(input: &str) -> Result<Self, MalformedTimeError> {
        let (hours, minutes) = input
            .split_once(':')
            .ok_or_else(|| MalformedTimeError::new(input))?;

        let valid_part = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !valid_part(hours, 2) || minutes.len() != 2 || !valid_part(minutes, 2) {
            return Err(MalformedTimeError::new(input));
        }

        let hour: u16 = hours.parse().map_err(|_| MalformedTimeError::new(input))?;
        let minute: u16 = minutes.parse().map_err(|_| MalformedTimeError::new(input))?;

        Self::from_hm(hour, minute).ok_or_else(|| MalformedTimeError::new(input))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = MalformedTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = MalformedTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Half-open overlap: `[s1, e1)` and `[s2, e2)` share at least one minute.
pub fn ranges_overlap(s1: ClockTime, e1: ClockTime, s2: ClockTime, e2: ClockTime) -> bool {
    s1 < e2 && s2 < e1
}
