// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Club operating hours and wall-clock conversion.
//!
//! Every rule that compares a booking against "now" (the past check, the
//! cancellation cutoff, the walk-in start tick, reporting day buckets) is
//! evaluated in the club's own timezone. Instants are carried as UTC
//! `time::OffsetDateTime`; conversion goes through `chrono-tz`.

use crate::error::DomainError;
use crate::slot::{HalfHour, TimeRange};
use chrono::{Datelike, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// A club as seen by the booking engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClub")]
pub struct Club {
    id: i64,
    name: String,
    timezone: String,
    open: HalfHour,
    close: HalfHour,
}

#[derive(Deserialize)]
struct RawClub {
    id: i64,
    name: String,
    timezone: String,
    open: HalfHour,
    close: HalfHour,
}

impl TryFrom<RawClub> for Club {
    type Error = DomainError;

    fn try_from(raw: RawClub) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.name, raw.timezone, raw.open, raw.close)
    }
}

/// A wall-clock reading in the club's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalMoment {
    /// The local calendar date.
    pub date: Date,
    /// Minutes since local midnight.
    pub minute_of_day: u32,
}

impl LocalMoment {
    /// The half-hour tick containing this moment.
    #[must_use]
    pub fn tick(&self) -> HalfHour {
        HalfHour::floor_of_minute(self.minute_of_day)
    }
}

impl Club {
    /// Creates a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown or `open >= close`.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        timezone: impl Into<String>,
        open: HalfHour,
        close: HalfHour,
    ) -> Result<Self, DomainError> {
        let timezone: String = timezone.into();
        parse_timezone(&timezone)?;
        if open >= close {
            return Err(DomainError::InvalidOperatingHours(format!(
                "opening {open} must be before closing {close}"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            timezone,
            open,
            close,
        })
    }

    /// The club identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The IANA timezone name.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Opening tick.
    #[must_use]
    pub const fn open(&self) -> HalfHour {
        self.open
    }

    /// Closing tick.
    #[must_use]
    pub const fn close(&self) -> HalfHour {
        self.close
    }

    /// The operating hours as a range.
    #[must_use]
    pub const fn operating_hours(&self) -> TimeRange {
        // `new` guarantees open < close
        TimeRange::from_ordered(self.open, self.close)
    }

    /// Checks that a range lies within operating hours.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutsideOperatingHours` otherwise.
    pub fn validate_range(&self, range: &TimeRange) -> Result<(), DomainError> {
        if range.is_within(&self.operating_hours()) {
            Ok(())
        } else {
            Err(DomainError::OutsideOperatingHours {
                start: range.start().to_string(),
                end: range.end().to_string(),
                open: self.open.to_string(),
                close: self.close.to_string(),
            })
        }
    }

    /// Converts an instant to the club's wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the instant cannot be represented.
    pub fn local_moment(&self, instant: OffsetDateTime) -> Result<LocalMoment, DomainError> {
        let tz: Tz = parse_timezone(&self.timezone)?;
        let utc = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0).ok_or_else(
            || DomainError::DateConversion(format!("instant {instant} is out of range")),
        )?;
        let local = utc.with_timezone(&tz);
        Ok(LocalMoment {
            date: from_naive_date(local.date_naive())?,
            minute_of_day: local.time().num_seconds_from_midnight() / 60,
        })
    }

    /// Converts a local date and tick to an instant.
    ///
    /// Tick 48 resolves to midnight of the following day. Ambiguous local
    /// times (DST fall-back) resolve to the earlier instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the local time is skipped by a DST transition.
    pub fn instant_at(&self, date: Date, tick: HalfHour) -> Result<OffsetDateTime, DomainError> {
        let tz: Tz = parse_timezone(&self.timezone)?;
        let midnight = to_naive_date(date)?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DomainError::DateConversion(format!("midnight of {date}")))?;
        let naive = midnight + chrono::Duration::minutes(tick.minutes());
        let local = tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| DomainError::NonexistentLocalTime {
                date,
                hour: tick.to_string(),
            })?;
        OffsetDateTime::from_unix_timestamp(local.timestamp())
            .map_err(|e| DomainError::DateConversion(e.to_string()))
    }
}

fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

fn to_naive_date(date: Date) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )
    .ok_or_else(|| DomainError::DateConversion(format!("date {date} is out of range")))
}

fn from_naive_date(date: NaiveDate) -> Result<Date, DomainError> {
    let month: u8 = date
        .month()
        .to_u8()
        .ok_or_else(|| DomainError::DateConversion(format!("month of {date}")))?;
    let day: u8 = date
        .day()
        .to_u8()
        .ok_or_else(|| DomainError::DateConversion(format!("day of {date}")))?;
    let month: time::Month =
        time::Month::try_from(month).map_err(|e| DomainError::DateConversion(e.to_string()))?;
    Date::from_calendar_date(date.year(), month, day)
        .map_err(|e| DomainError::DateConversion(e.to_string()))
}
