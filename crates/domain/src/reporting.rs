// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only reporting over the booking store.
//!
//! Revenue is attributed to the club-local date of checkout, falling back to
//! the booking date when a completed booking carries no checkout instant.

use crate::booking::Booking;
use crate::booking_status::BookingStatus;
use crate::club::Club;
use crate::error::DomainError;
use crate::formats::iso_date;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::{Date, Duration, OffsetDateTime};

/// Bucket width for revenue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePeriod {
    /// One bucket per calendar day.
    Day,
    /// One bucket per ISO week (Monday start).
    Week,
    /// One bucket per calendar month.
    Month,
}

impl RevenuePeriod {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    fn bucket_start(self, date: Date) -> Date {
        match self {
            Self::Day => date,
            Self::Week => {
                date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
            }
            Self::Month => date.replace_day(1).unwrap_or(date),
        }
    }

    fn label(self, bucket_start: Date) -> String {
        match self {
            Self::Day => bucket_start.to_string(),
            Self::Week => {
                let (year, week, _) = bucket_start.to_iso_week_date();
                format!("{year}-W{week:02}")
            }
            Self::Month => format!(
                "{}-{:02}",
                bucket_start.year(),
                u8::from(bucket_start.month())
            ),
        }
    }
}

impl FromStr for RevenuePeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(DomainError::InvalidReportingPeriod(s.to_string())),
        }
    }
}

/// Revenue for one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueBucket {
    /// Human-readable bucket label (`2026-10-19`, `2026-W43`, `2026-10`).
    pub label: String,
    /// First date of the bucket.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// Sum of billed amounts, in minor units.
    pub revenue: i64,
    /// Number of completed sessions.
    pub sessions: u32,
}

/// Headline numbers for a club's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// The club-local date the numbers refer to.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Non-cancelled bookings scheduled for today.
    pub todays_bookings: u32,
    /// Sessions currently checked in.
    pub active_sessions: u32,
    /// Sessions completed today.
    pub completed_today: u32,
    /// Revenue from sessions completed today, in minor units.
    pub revenue_today: i64,
}

/// The club-local date a completed booking's revenue belongs to.
///
/// # Errors
///
/// Returns an error if the checkout instant cannot be converted.
pub fn revenue_date(club: &Club, booking: &Booking) -> Result<Date, DomainError> {
    booking
        .check_out_at
        .map_or(Ok(booking.booking_date), |at| {
            club.local_moment(at).map(|moment| moment.date)
        })
}

/// Buckets completed revenue by day, week, or month.
///
/// Only `completed` bookings contribute. `from`/`to` bound the revenue date
/// inclusively. Buckets are returned in chronological order.
///
/// # Errors
///
/// Returns an error if a checkout instant cannot be converted.
pub fn revenue_by_time(
    club: &Club,
    bookings: &[Booking],
    period: RevenuePeriod,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<RevenueBucket>, DomainError> {
    let mut buckets: BTreeMap<Date, (i64, u32)> = BTreeMap::new();

    for booking in bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
    {
        let date: Date = revenue_date(club, booking)?;
        if from.is_some_and(|from| date < from) || to.is_some_and(|to| date > to) {
            continue;
        }
        let entry = buckets.entry(period.bucket_start(date)).or_insert((0, 0));
        entry.0 = entry
            .0
            .checked_add(booking.total_amount.unwrap_or(0))
            .ok_or(DomainError::AmountOverflow)?;
        entry.1 = entry.1.saturating_add(1);
    }

    Ok(buckets
        .into_iter()
        .map(|(start_date, (revenue, sessions))| RevenueBucket {
            label: period.label(start_date),
            start_date,
            revenue,
            sessions,
        })
        .collect())
}

/// Computes dashboard numbers as of `now`.
///
/// # Errors
///
/// Returns an error if instants cannot be converted to club-local time.
pub fn dashboard_stats(
    club: &Club,
    bookings: &[Booking],
    now: OffsetDateTime,
) -> Result<DashboardStats, DomainError> {
    let today: Date = club.local_moment(now)?.date;

    let todays_bookings: usize = bookings
        .iter()
        .filter(|b| b.booking_date == today && b.status != BookingStatus::Cancelled)
        .count();
    let active_sessions: usize = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::CheckedIn)
        .count();

    let mut completed_today: u32 = 0;
    let mut revenue_today: i64 = 0;
    for booking in bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
    {
        if revenue_date(club, booking)? == today {
            completed_today = completed_today.saturating_add(1);
            revenue_today = revenue_today
                .checked_add(booking.total_amount.unwrap_or(0))
                .ok_or(DomainError::AmountOverflow)?;
        }
    }

    Ok(DashboardStats {
        date: today,
        todays_bookings: todays_bookings.to_u32().unwrap_or(u32::MAX),
        active_sessions: active_sessions.to_u32().unwrap_or(u32::MAX),
        completed_today,
        revenue_today,
    })
}
