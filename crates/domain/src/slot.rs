// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Half-hour time grid.
//!
//! Bookings are placed on a grid of half-hour ticks within one calendar day.
//! Tick `0` is midnight and tick `48` is the end of the day. Callers speak in
//! fractional hours (`18.5` is 18:30); internally the tick index is stored so
//! that overlap tests are exact integer comparisons.

use crate::error::DomainError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of ticks in a day.
const TICKS_PER_DAY: u8 = 48;

/// Minutes per tick.
pub const MINUTES_PER_TICK: i64 = 30;

/// A point on the half-hour grid of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HalfHour(u8);

impl HalfHour {
    /// Midnight at the start of the day.
    pub const MIDNIGHT: Self = Self(0);
    /// Midnight at the end of the day.
    pub const END_OF_DAY: Self = Self(TICKS_PER_DAY);

    /// Creates a tick from its index (`0..=48`).
    ///
    /// # Errors
    ///
    /// Returns an error if the index is past the end of the day.
    pub fn from_index(index: u8) -> Result<Self, DomainError> {
        if index > TICKS_PER_DAY {
            return Err(DomainError::InvalidHalfHour(format!(
                "tick {index} is past the end of the day"
            )));
        }
        Ok(Self(index))
    }

    /// Creates a tick from fractional hours, e.g. `18.5` for 18:30.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a multiple of `0.5` in `0..=24`.
    pub fn from_hours(hours: f64) -> Result<Self, DomainError> {
        if !hours.is_finite() {
            return Err(DomainError::InvalidHalfHour(format!("{hours} is not finite")));
        }
        let doubled: f64 = hours * 2.0;
        if (doubled - doubled.round()).abs() > f64::EPSILON {
            return Err(DomainError::InvalidHalfHour(format!(
                "{hours} is not aligned to a half hour"
            )));
        }
        let index: u8 = doubled.round().to_u8().ok_or_else(|| {
            DomainError::InvalidHalfHour(format!("{hours} is outside 0..=24"))
        })?;
        Self::from_index(index)
    }

    /// Returns the tick containing the given minute of the day (floored).
    #[must_use]
    pub fn floor_of_minute(minute_of_day: u32) -> Self {
        let index: u32 = (minute_of_day / 30).min(u32::from(TICKS_PER_DAY));
        Self(index.to_u8().unwrap_or(TICKS_PER_DAY))
    }

    /// Returns the tick index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the tick as fractional hours.
    #[must_use]
    pub fn hours(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Returns minutes since midnight.
    #[must_use]
    pub fn minutes(self) -> i64 {
        i64::from(self.0) * MINUTES_PER_TICK
    }
}

impl std::fmt::Display for HalfHour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 2, (self.0 % 2) * 30)
    }
}

impl Serialize for HalfHour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.hours())
    }
}

impl<'de> Deserialize<'de> for HalfHour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hours: f64 = f64::deserialize(deserializer)?;
        Self::from_hours(hours).map_err(serde::de::Error::custom)
    }
}

/// A half-open interval `[start, end)` on the half-hour grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: HalfHour,
    end: HalfHour,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: HalfHour,
    end: HalfHour,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = DomainError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Creates a range, rejecting empty and reversed intervals.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRange` if `start >= end`.
    pub fn new(start: HalfHour, end: HalfHour) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a range from bounds the caller already knows are ordered.
    pub(crate) const fn from_ordered(start: HalfHour, end: HalfHour) -> Self {
        Self { start, end }
    }

    /// Creates a range from fractional hours.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is off-grid or `start >= end`.
    pub fn from_hours(start: f64, end: f64) -> Result<Self, DomainError> {
        Self::new(HalfHour::from_hours(start)?, HalfHour::from_hours(end)?)
    }

    /// Start of the range (inclusive).
    #[must_use]
    pub const fn start(&self) -> HalfHour {
        self.start
    }

    /// End of the range (exclusive).
    #[must_use]
    pub const fn end(&self) -> HalfHour {
        self.end
    }

    /// Half-open overlap test: `a.start < b.end && a.end > b.start`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Returns true if `tick` falls in `[start, end)`.
    #[must_use]
    pub fn covers(&self, tick: HalfHour) -> bool {
        self.start <= tick && tick < self.end
    }

    /// Returns true if `self` lies entirely within `outer`.
    #[must_use]
    pub fn is_within(&self, outer: &Self) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }

    /// Length of the range in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        self.end.minutes() - self.start.minutes()
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
