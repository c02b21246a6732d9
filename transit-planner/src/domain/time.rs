//! Instants and times of day.
//!
//! The engine does all of its arithmetic on signed 64-bit milliseconds.
//! [`Timestamp`] is an absolute instant (millis since the Unix epoch, read
//! in UTC); [`TimeOfDay`] is a position within a day, which is what schedule
//! edges carry. Calendar days are plain day numbers since the epoch, so
//! traffic-day lookups never leave integer math.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Error returned when constructing an out-of-range time of day.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// An absolute instant: milliseconds since the Unix epoch, UTC.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::Timestamp;
/// use chrono::NaiveDate;
///
/// let midnight = NaiveDate::from_ymd_opt(2024, 3, 15)
///     .unwrap()
///     .and_hms_opt(0, 0, 0)
///     .unwrap();
/// let t = Timestamp::from_datetime(midnight);
/// assert_eq!(t.time_of_day().as_millis(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from milliseconds since the epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns milliseconds since the epoch.
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Create a timestamp from a naive datetime, read as UTC.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.and_utc().timestamp_millis())
    }

    /// The day this instant falls on, counted in whole days since the epoch.
    ///
    /// Instants before the epoch land on negative day numbers.
    pub const fn day_number(self) -> i64 {
        self.0.div_euclid(DAY_MILLIS)
    }

    /// The position of this instant within its day.
    pub const fn time_of_day(self) -> TimeOfDay {
        TimeOfDay(self.0.rem_euclid(DAY_MILLIS))
    }

    /// Signed duration from `other` to `self`.
    pub fn signed_duration_since(self, other: Timestamp) -> Duration {
        Duration::milliseconds(self.0 - other.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs.num_milliseconds())
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 - rhs.num_milliseconds())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// A position within a day: milliseconds since midnight, `0..DAY_MILLIS`.
///
/// Schedule edges store the departure (or arrival) they represent as a time
/// of day; the calendar decides which days that departure runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay(i64);

impl TimeOfDay {
    /// Create from hours, minutes and seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::TimeOfDay;
    ///
    /// let t = TimeOfDay::from_hms(8, 30, 0).unwrap();
    /// assert_eq!(t.as_millis(), 30_600_000);
    /// assert!(TimeOfDay::from_hms(24, 0, 0).is_err());
    /// ```
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Ok(Self(
            (i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second)) * 1000,
        ))
    }

    /// Create from milliseconds since midnight.
    pub fn from_millis(millis: i64) -> Result<Self, TimeError> {
        if !(0..DAY_MILLIS).contains(&millis) {
            return Err(TimeError::new("must be within one day"));
        }
        Ok(Self(millis))
    }

    /// Returns milliseconds since midnight.
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds from `self` to `other` within the same day.
    ///
    /// Negative when `other` is earlier in the day.
    pub const fn millis_until(self, other: TimeOfDay) -> i64 {
        other.0 - self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / 1000;
        write!(f, "{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}
