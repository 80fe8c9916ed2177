// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking_status::BookingStatus;
use crate::slot::{HalfHour, TimeRange};
use crate::types::TableType;
use time::{Date, OffsetDateTime};

/// A reservation of one table of a given type for a time range.
///
/// A scheduled booking reserves capacity of a *type*; the physical table is
/// only resolved at check-in (`assigned_table`). Walk-ins are created already
/// checked in and may leave `end` open until the session is ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Store-assigned identifier.
    pub booking_id: i64,
    /// The club.
    pub club_id: i64,
    /// The reserved table type.
    pub table_type: TableType,
    /// Physical table, once checked in.
    pub assigned_table: Option<i32>,
    /// The customer, if known. Staff walk-ins may have none.
    pub user_id: Option<String>,
    /// Local calendar date of the booking.
    pub booking_date: Date,
    /// First tick of the reservation.
    pub start: HalfHour,
    /// End tick (exclusive); `None` for an open-ended walk-in.
    pub end: Option<HalfHour>,
    /// Whether the booking was opened on the spot by staff.
    pub is_walk_in: bool,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Hourly rate frozen at creation, in minor units.
    pub rate_per_hour: i64,
    /// Billed amount, set exactly once at completion.
    pub total_amount: Option<i64>,
    /// When the player checked in.
    pub check_in_at: Option<OffsetDateTime>,
    /// When the session ended.
    pub check_out_at: Option<OffsetDateTime>,
    /// When the booking was cancelled.
    pub cancelled_at: Option<OffsetDateTime>,
    /// Free-text note from the customer.
    pub note: Option<String>,
    /// Client-supplied key that makes creation retry-safe.
    pub idempotency_key: Option<String>,
    /// The actor that created the booking.
    pub created_by: String,
    /// Creation instant.
    pub created_at: OffsetDateTime,
}

impl Booking {
    /// Returns true if this booking holds capacity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The scheduled range, if the booking has an end.
    #[must_use]
    pub fn scheduled_range(&self) -> Option<TimeRange> {
        self.end.and_then(|end| TimeRange::new(self.start, end).ok())
    }

    /// The range this booking occupies for capacity purposes.
    ///
    /// Open-ended walk-ins occupy until the club closes. A walk-in opened at
    /// the closing tick still occupies one tick.
    #[must_use]
    pub fn occupied_range(&self, close: HalfHour) -> TimeRange {
        if let Some(range) = self.scheduled_range() {
            return range;
        }
        let end: HalfHour = if close > self.start {
            close
        } else {
            HalfHour::from_index(self.start.index().saturating_add(1))
                .unwrap_or(HalfHour::END_OF_DAY)
        };
        TimeRange::new(self.start, end)
            .unwrap_or_else(|_| TimeRange::from_ordered(self.start, HalfHour::END_OF_DAY))
    }

    /// Scheduled length in minutes, if the booking has an end.
    #[must_use]
    pub fn scheduled_minutes(&self) -> Option<i64> {
        self.scheduled_range().map(|range| range.duration_minutes())
    }
}
