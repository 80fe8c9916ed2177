// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod actor;
mod apply;
mod clock;
mod command;
mod error;
mod event;
mod state;

#[cfg(test)]
mod tests;

use cuebook_domain::{Booking, BookingStatus, Club, DomainError};
use time::OffsetDateTime;

// Re-export public types and functions
pub use actor::{Actor, ActorKind};
pub use apply::{apply, apply_create, preview_end_play};
pub use clock::{Clock, FixedClock, SystemClock};
pub use command::Command;
pub use error::CoreError;
pub use event::{BookingEvent, NullPublisher, Publisher, Topic, publish_all};
pub use state::{HistoryEntry, Partition, TransitionResult};

/// Returns true if an actor may cancel a booking.
///
/// Staff and system actors may cancel any booking; a user only their own.
#[must_use]
pub fn may_cancel(actor: &Actor, booking: &Booking) -> bool {
    actor.is_privileged() || booking.user_id.as_deref() == Some(actor.id.as_str())
}

/// Returns true if a pending booking has reached its start instant.
///
/// This is a read-only check used by the expiry sweeper to select
/// candidates before attempting the `ExpirePending` transition.
///
/// # Errors
///
/// Returns an error if the booking's start cannot be resolved in the club's
/// timezone.
pub fn is_expired_pending(
    club: &Club,
    booking: &Booking,
    now: OffsetDateTime,
) -> Result<bool, DomainError> {
    if booking.status != BookingStatus::Pending {
        return Ok(false);
    }
    Ok(club.instant_at(booking.booking_date, booking.start)? <= now)
}

/// Returns true if a confirmed booking reached its end without being seated.
///
/// The sweeper releases such bookings with `ReleaseNoShow`.
///
/// # Errors
///
/// Returns an error if the booking's end cannot be resolved in the club's
/// timezone.
pub fn is_no_show(
    club: &Club,
    booking: &Booking,
    now: OffsetDateTime,
) -> Result<bool, DomainError> {
    if booking.status != BookingStatus::Confirmed {
        return Ok(false);
    }
    let end = booking.occupied_range(club.close()).end();
    Ok(club.instant_at(booking.booking_date, end)? <= now)
}
