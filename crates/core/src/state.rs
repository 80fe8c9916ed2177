// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::actor::Actor;
use crate::event::BookingEvent;
use cuebook_domain::{
    Availability, Booking, BookingStatus, Club, Table, TableStatus, TableType, TimeRange,
    calculate_availability,
};
use num_traits::ToPrimitive;
use time::{Date, OffsetDateTime};

/// Everything a transition needs to know about one `(club, type, date)`.
///
/// The store loads a partition inside the write transaction, so the
/// capacity decision made against it is serialized with every other
/// writer of the same club.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// The club.
    pub club: Club,
    /// The table type.
    pub table_type: TableType,
    /// The club-local date.
    pub date: Date,
    /// Physical tables of this type in the club.
    pub tables: Vec<Table>,
    /// The current hourly rate, if configured.
    pub rate_per_hour: Option<i64>,
    /// Active bookings of this type on this date.
    pub bookings: Vec<Booking>,
    /// Table numbers held by checked-in bookings of this type, on any date.
    pub checked_in_tables: Vec<i32>,
}

impl Partition {
    /// Creates an empty partition.
    #[must_use]
    pub const fn new(club: Club, table_type: TableType, date: Date) -> Self {
        Self {
            club,
            table_type,
            date,
            tables: Vec::new(),
            rate_per_hour: None,
            bookings: Vec::new(),
            checked_in_tables: Vec::new(),
        }
    }

    /// Number of physical tables of this type.
    #[must_use]
    pub fn total_tables(&self) -> u32 {
        self.tables.len().to_u32().unwrap_or(u32::MAX)
    }

    /// Availability of the partition over `range`.
    #[must_use]
    pub fn availability(&self, range: &TimeRange) -> Availability {
        let close = self.club.close();
        calculate_availability(
            self.total_tables(),
            self.bookings
                .iter()
                .filter(|b| b.is_active())
                .map(|b| b.occupied_range(close)),
            range,
        )
    }
}

/// One row of a booking's transition history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The command name.
    pub action: String,
    /// Status before; `None` for creation.
    pub from: Option<BookingStatus>,
    /// Status after.
    pub to: BookingStatus,
    /// Who did it.
    pub actor: Actor,
    /// When.
    pub at: OffsetDateTime,
    /// Human-readable detail.
    pub details: Option<String>,
}

/// The result of a successful transition.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects. For creations `booking.booking_id` is zero until the store
/// assigns one; `events` must be called afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The booking after the transition.
    pub booking: Booking,
    /// The history row recording this transition.
    pub history: HistoryEntry,
    /// Whether capacity of the partition changed.
    pub availability_changed: bool,
    /// A physical table whose cached status should change.
    pub table_hint: Option<(i32, TableStatus)>,
}

impl TransitionResult {
    /// The status before the transition.
    #[must_use]
    pub const fn from(&self) -> Option<BookingStatus> {
        self.history.from
    }

    /// The status after the transition.
    #[must_use]
    pub const fn to(&self) -> BookingStatus {
        self.history.to
    }

    /// The events to broadcast once the transition is committed.
    #[must_use]
    pub fn events(&self) -> Vec<BookingEvent> {
        let booking: &Booking = &self.booking;
        let mut events: Vec<BookingEvent> = vec![BookingEvent::BookingUpdated {
            club_id: booking.club_id,
            booking_id: booking.booking_id,
            status: booking.status,
            booking_date: booking.booking_date,
            start_hour: booking.start,
            end_hour: booking.end,
        }];
        if self.availability_changed {
            events.push(BookingEvent::AvailabilityChanged {
                club_id: booking.club_id,
                table_type: booking.table_type,
                booking_date: booking.booking_date,
                start_hour: booking.start,
                end_hour: booking.end,
            });
        }
        events
    }
}
