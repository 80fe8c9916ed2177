// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking_status::BookingStatus;

/// Errors that can occur while validating booking rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An hour value is not on the half-hour grid or lies outside `0..=24`.
    InvalidHalfHour(String),
    /// A time range is empty or reversed.
    InvalidRange {
        /// Start of the rejected range, in hours.
        start: String,
        /// End of the rejected range, in hours.
        end: String,
    },
    /// A time range falls outside the club's operating hours.
    OutsideOperatingHours {
        /// Start of the rejected range, in hours.
        start: String,
        /// End of the rejected range, in hours.
        end: String,
        /// Club opening hour.
        open: String,
        /// Club closing hour.
        close: String,
    },
    /// The requested range has already ended.
    RangeInPast {
        /// The booking date.
        date: time::Date,
        /// End of the range, in hours.
        end: String,
    },
    /// The club is configured with invalid operating hours.
    InvalidOperatingHours(String),
    /// A table type string is not recognized.
    InvalidTableType(String),
    /// A table status string is not recognized.
    InvalidTableStatus(String),
    /// A booking status string is not recognized.
    InvalidBookingStatus(String),
    /// A reporting period string is not recognized.
    InvalidReportingPeriod(String),
    /// A status transition is not allowed by the booking lifecycle.
    InvalidTransition {
        /// The current status.
        from: BookingStatus,
        /// The requested status.
        to: BookingStatus,
    },
    /// No physical table of the requested type is free for the range.
    NoTableAvailable {
        /// The table type that was requested.
        table_type: String,
    },
    /// A reservation was checked in on a day other than its booking date.
    CheckInOutsideBookingDate {
        /// The booking date.
        booking_date: time::Date,
        /// The club-local date of the attempt.
        today: time::Date,
    },
    /// The requested physical table is already in use.
    TableOccupied {
        /// The table number.
        table_number: i32,
    },
    /// The requested physical table does not exist or has the wrong type.
    TableNotFound {
        /// The club identifier.
        club_id: i64,
        /// The table number.
        table_number: i32,
    },
    /// Cancellation was attempted less than the cutoff before start.
    CancellationWindowClosed {
        /// Minutes remaining until the booking starts (negative once started).
        minutes_until_start: i64,
    },
    /// A billable duration was zero or negative.
    InvalidDuration {
        /// The rejected duration, in seconds.
        seconds: i64,
    },
    /// A price is negative.
    InvalidRate(i64),
    /// The configured timezone is not a valid IANA name.
    InvalidTimezone(String),
    /// A wall-clock time does not exist in the club's timezone.
    NonexistentLocalTime {
        /// The local date.
        date: time::Date,
        /// The local hour, on the half-hour grid.
        hour: String,
    },
    /// Date or time conversion failed.
    DateConversion(String),
    /// Money arithmetic overflowed.
    AmountOverflow,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHalfHour(msg) => write!(f, "Invalid hour: {msg}"),
            Self::InvalidRange { start, end } => {
                write!(f, "Invalid time range [{start}, {end}): start must be before end")
            }
            Self::OutsideOperatingHours {
                start,
                end,
                open,
                close,
            } => {
                write!(
                    f,
                    "Time range [{start}, {end}) is outside operating hours [{open}, {close})"
                )
            }
            Self::RangeInPast { date, end } => {
                write!(f, "Time range on {date} ending at {end} is already in the past")
            }
            Self::InvalidOperatingHours(msg) => write!(f, "Invalid operating hours: {msg}"),
            Self::InvalidTableType(s) => {
                write!(f, "Invalid table type '{s}'. Must be pool, carom, or snooker")
            }
            Self::InvalidTableStatus(s) => write!(f, "Invalid table status '{s}'"),
            Self::InvalidBookingStatus(s) => write!(f, "Invalid booking status '{s}'"),
            Self::InvalidReportingPeriod(s) => {
                write!(f, "Invalid reporting period '{s}'. Must be day, week, or month")
            }
            Self::InvalidTransition { from, to } => {
                write!(
                    f,
                    "Invalid status transition from {} to {}",
                    from.as_str(),
                    to.as_str()
                )
            }
            Self::NoTableAvailable { table_type } => {
                write!(f, "No {table_type} table is available for the requested time")
            }
            Self::CheckInOutsideBookingDate {
                booking_date,
                today,
            } => {
                write!(f, "Booking for {booking_date} cannot be checked in on {today}")
            }
            Self::TableOccupied { table_number } => {
                write!(f, "Table {table_number} is currently occupied")
            }
            Self::TableNotFound {
                club_id,
                table_number,
            } => {
                write!(f, "Table {table_number} not found in club {club_id}")
            }
            Self::CancellationWindowClosed {
                minutes_until_start,
            } => {
                write!(
                    f,
                    "Bookings can only be cancelled at least one hour before start ({minutes_until_start} minutes remaining)"
                )
            }
            Self::InvalidDuration { seconds } => {
                write!(f, "Invalid billable duration: {seconds} seconds")
            }
            Self::InvalidRate(rate) => write!(f, "Invalid rate per hour: {rate}"),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::NonexistentLocalTime { date, hour } => {
                write!(f, "Local time {hour} on {date} does not exist in the club timezone")
            }
            Self::DateConversion(msg) => write!(f, "Date conversion failed: {msg}"),
            Self::AmountOverflow => write!(f, "Amount calculation overflowed"),
        }
    }
}

impl std::error::Error for DomainError {}
