// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cuebook_domain::{Booking, HalfHour, TableType, TimeRange};
use time::Date;

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request booking state changes. The first
/// two create a booking and go through `apply_create`; the rest target an
/// existing booking and go through `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reserve capacity of a table type for a future range.
    CreateBooking {
        /// The requested table type.
        table_type: TableType,
        /// The club-local date.
        date: Date,
        /// The requested range.
        range: TimeRange,
        /// The customer the booking is for.
        user_id: Option<String>,
        /// Free-text note.
        note: Option<String>,
        /// Client-supplied retry key.
        idempotency_key: Option<String>,
    },
    /// Open a walk-in session starting at the current half hour.
    OpenNow {
        /// The requested table type.
        table_type: TableType,
        /// A specific physical table, if staff picked one.
        table_number: Option<i32>,
        /// The customer, if known.
        user_id: Option<String>,
        /// Planned end tick; `None` plays until ended.
        end: Option<HalfHour>,
        /// Client-supplied retry key.
        idempotency_key: Option<String>,
    },
    /// The payment-confirmed signal.
    Confirm,
    /// Seat the customer at a physical table.
    CheckIn,
    /// Cancel before the cutoff.
    Cancel,
    /// Close the session and bill it.
    EndPlay,
    /// Cancel a pending booking whose start has passed.
    ExpirePending,
    /// Cancel a confirmed booking that was never seated before its end.
    ReleaseNoShow,
}

impl Command {
    /// The action name recorded in the booking history.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateBooking { .. } => "CreateBooking",
            Self::OpenNow { .. } => "OpenNow",
            Self::Confirm => "Confirm",
            Self::CheckIn => "CheckIn",
            Self::Cancel => "Cancel",
            Self::EndPlay => "EndPlay",
            Self::ExpirePending => "ExpirePending",
            Self::ReleaseNoShow => "ReleaseNoShow",
        }
    }

    /// Returns true for commands that create a booking.
    #[must_use]
    pub const fn is_creation(&self) -> bool {
        matches!(self, Self::CreateBooking { .. } | Self::OpenNow { .. })
    }

    /// Returns true if `existing` is the booking this creating command
    /// would have produced, so a retry with the same idempotency key may
    /// replay it.
    ///
    /// Non-creating commands never match.
    #[must_use]
    pub fn is_replay_of(&self, existing: &Booking) -> bool {
        match self {
            Self::CreateBooking {
                table_type,
                date,
                range,
                user_id,
                ..
            } => {
                !existing.is_walk_in
                    && existing.table_type == *table_type
                    && existing.booking_date == *date
                    && existing.start == range.start()
                    && existing.end == Some(range.end())
                    && existing.user_id == *user_id
            }
            Self::OpenNow {
                table_type,
                table_number,
                end,
                ..
            } => {
                existing.is_walk_in
                    && existing.table_type == *table_type
                    && existing.end == *end
                    && table_number.is_none_or(|number| existing.assigned_table == Some(number))
            }
            _ => false,
        }
    }
}
