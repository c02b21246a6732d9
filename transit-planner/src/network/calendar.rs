//! Service calendar: which validity patterns run on which traffic days.
//!
//! A traffic day is a whole day counted from the calendar's start date.
//! Patterns are word-packed bit rows indexed by [`ValidityId`], so a lookup
//! is two shifts and a mask and iteration order never depends on hashing.

use chrono::{Days, NaiveDate};

use crate::domain::{Timestamp, ValidityId};

/// Validity patterns over a bounded range of traffic days.
#[derive(Debug, Clone)]
pub struct Calendar {
    start: NaiveDate,
    start_day_number: i64,
    horizon_days: u32,
    patterns: Vec<Vec<u64>>,
}

impl Calendar {
    /// A calendar starting on `start`, covering `horizon_days` traffic days.
    pub fn new(start: NaiveDate, horizon_days: u32) -> Self {
        let start_day_number = start.signed_duration_since(NaiveDate::default()).num_days();
        Self {
            start,
            start_day_number,
            horizon_days,
            patterns: Vec::new(),
        }
    }

    /// First day of the calendar.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Day after the last covered traffic day.
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.horizon_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of traffic days covered.
    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Register a pattern active on the given traffic days.
    ///
    /// Days at or beyond the horizon are ignored.
    pub fn add_pattern<I>(&mut self, active_days: I) -> ValidityId
    where
        I: IntoIterator<Item = u32>,
    {
        let words = (self.horizon_days as usize).div_ceil(64);
        let mut bits = vec![0u64; words];
        for day in active_days {
            if day < self.horizon_days {
                bits[day as usize / 64] |= 1 << (day % 64);
            }
        }
        let id = ValidityId(self.patterns.len() as u32);
        self.patterns.push(bits);
        id
    }

    /// Register a pattern active on every covered traffic day.
    pub fn add_daily_pattern(&mut self) -> ValidityId {
        self.add_pattern(0..self.horizon_days)
    }

    /// Whether `validity` is active on traffic day `day`.
    ///
    /// Unknown ids and days beyond the horizon are inactive.
    pub fn is_active(&self, validity: ValidityId, day: u32) -> bool {
        if day >= self.horizon_days {
            return false;
        }
        match self.patterns.get(validity.index()) {
            Some(bits) => bits[day as usize / 64] & (1 << (day % 64)) != 0,
            None => false,
        }
    }

    /// The traffic day `at` falls on, or `None` before the calendar starts.
    pub fn traffic_day(&self, at: Timestamp) -> Option<u32> {
        let day = at.day_number() - self.start_day_number;
        u32::try_from(day).ok()
    }

    /// Whether `validity` is active at the instant `at`.
    pub fn is_active_at(&self, validity: ValidityId, at: Timestamp) -> bool {
        match self.traffic_day(at) {
            Some(day) => self.is_active(validity, day),
            None => false,
        }
    }
}
