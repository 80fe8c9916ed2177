// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::club::Club;
use crate::error::DomainError;
use crate::slot::TimeRange;
use time::{Date, Duration, OffsetDateTime};

/// How long before start a booking can still be cancelled.
pub const CANCELLATION_CUTOFF: Duration = Duration::hours(1);

/// Validates a requested booking range against the club and the clock.
///
/// The range must lie within operating hours and must not have fully ended.
/// A range that has started but not ended is accepted. Both ends must exist
/// as wall-clock times in the club's timezone, so a range starting inside a
/// daylight-saving gap is rejected.
///
/// # Errors
///
/// Returns `OutsideOperatingHours`, `NonexistentLocalTime`, or `RangeInPast`.
pub fn validate_booking_window(
    club: &Club,
    date: Date,
    range: &TimeRange,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    club.validate_range(range)?;

    club.instant_at(date, range.start())?;
    let ends_at: OffsetDateTime = club.instant_at(date, range.end())?;
    if ends_at <= now {
        return Err(DomainError::RangeInPast {
            date,
            end: range.end().to_string(),
        });
    }
    Ok(())
}

/// Validates that a booking starting at `starts_at` may still be cancelled.
///
/// # Errors
///
/// Returns `CancellationWindowClosed` once `now` is past `start - 1h`.
pub fn validate_cancellation(
    starts_at: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if now > starts_at - CANCELLATION_CUTOFF {
        return Err(DomainError::CancellationWindowClosed {
            minutes_until_start: (starts_at - now).whole_minutes(),
        });
    }
    Ok(())
}
