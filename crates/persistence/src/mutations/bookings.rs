// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! Updates of an existing booking are compare-and-swap on its status: the
//! `UPDATE` matches only if the row still holds the status the transition
//! was computed from. Zero affected rows is reported as
//! `PersistenceError::StaleWrite`, which callers treat as retryable.

use cuebook::{HistoryEntry, TransitionResult};
use cuebook_domain::{Booking, BookingStatus};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{date_to_column, instant_to_column, tick_to_column};
use crate::diesel_schema::{booking_history, bookings};
use crate::error::PersistenceError;
use crate::mutations::registry::set_table_status;

/// Inserts a new booking and returns its assigned ID.
///
/// # Errors
///
/// Returns an error if the insert fails, including a duplicate
/// idempotency key.
pub fn insert_booking(conn: &mut SqliteConnection, booking: &Booking) -> Result<i64, PersistenceError> {
    let check_in_at: Option<String> = booking.check_in_at.map(instant_to_column).transpose()?;
    let check_out_at: Option<String> = booking.check_out_at.map(instant_to_column).transpose()?;
    let cancelled_at: Option<String> = booking.cancelled_at.map(instant_to_column).transpose()?;

    diesel::insert_into(bookings::table)
        .values((
            bookings::club_id.eq(booking.club_id),
            bookings::table_type.eq(booking.table_type.as_str()),
            bookings::assigned_table_number.eq(booking.assigned_table),
            bookings::user_id.eq(booking.user_id.as_deref()),
            bookings::booking_date.eq(date_to_column(booking.booking_date)?),
            bookings::start_tick.eq(tick_to_column(booking.start)),
            bookings::end_tick.eq(booking.end.map(tick_to_column)),
            bookings::is_walk_in.eq(i32::from(booking.is_walk_in)),
            bookings::status.eq(booking.status.as_str()),
            bookings::rate_per_hour.eq(booking.rate_per_hour),
            bookings::total_amount.eq(booking.total_amount),
            bookings::check_in_at.eq(check_in_at),
            bookings::check_out_at.eq(check_out_at),
            bookings::cancelled_at.eq(cancelled_at),
            bookings::note.eq(booking.note.as_deref()),
            bookings::idempotency_key.eq(booking.idempotency_key.as_deref()),
            bookings::created_by.eq(booking.created_by.as_str()),
            bookings::created_at.eq(instant_to_column(booking.created_at)?),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Writes the mutable columns of a booking if it still has status `expected`.
///
/// # Errors
///
/// Returns `PersistenceError::StaleWrite` if no row matched, or another
/// error if the update fails.
pub fn update_booking_if_status(
    conn: &mut SqliteConnection,
    booking: &Booking,
    expected: BookingStatus,
) -> Result<(), PersistenceError> {
    let check_in_at: Option<String> = booking.check_in_at.map(instant_to_column).transpose()?;
    let check_out_at: Option<String> = booking.check_out_at.map(instant_to_column).transpose()?;
    let cancelled_at: Option<String> = booking.cancelled_at.map(instant_to_column).transpose()?;

    let updated: usize = diesel::update(
        bookings::table
            .filter(bookings::booking_id.eq(booking.booking_id))
            .filter(bookings::status.eq(expected.as_str())),
    )
    .set((
        bookings::status.eq(booking.status.as_str()),
        bookings::assigned_table_number.eq(booking.assigned_table),
        bookings::total_amount.eq(booking.total_amount),
        bookings::check_in_at.eq(check_in_at),
        bookings::check_out_at.eq(check_out_at),
        bookings::cancelled_at.eq(cancelled_at),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::StaleWrite {
            booking_id: booking.booking_id,
            expected: expected.as_str().to_string(),
        });
    }
    Ok(())
}

/// Appends a history row for a booking.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_history(
    conn: &mut SqliteConnection,
    booking_id: i64,
    entry: &HistoryEntry,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(booking_history::table)
        .values((
            booking_history::booking_id.eq(booking_id),
            booking_history::action.eq(entry.action.as_str()),
            booking_history::from_status.eq(entry.from.map(|s| s.as_str())),
            booking_history::to_status.eq(entry.to.as_str()),
            booking_history::actor_id.eq(entry.actor.id.as_str()),
            booking_history::actor_kind.eq(entry.actor.kind.as_str()),
            booking_history::recorded_at.eq(instant_to_column(entry.at)?),
            booking_history::details.eq(entry.details.as_deref()),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Persists a transition result.
///
/// Creations insert the booking and write the assigned ID back into
/// `result.booking`; other transitions update it by compare-and-swap. The
/// history row and the table status hint follow in the same transaction.
///
/// # Errors
///
/// Returns an error if any statement fails or the booking changed
/// underneath the transition.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &mut TransitionResult,
) -> Result<(), PersistenceError> {
    match result.from() {
        None => {
            let booking_id: i64 = insert_booking(conn, &result.booking)?;
            result.booking.booking_id = booking_id;
            debug!(booking_id, "Inserted booking");
        }
        Some(expected) => {
            update_booking_if_status(conn, &result.booking, expected)?;
        }
    }

    let history_id: i64 = insert_history(conn, result.booking.booking_id, &result.history)?;
    debug!(history_id, "Recorded booking history");

    if let Some((table_number, status)) = result.table_hint {
        set_table_status(conn, result.booking.club_id, table_number, status)?;
    }

    info!(
        booking_id = result.booking.booking_id,
        action = %result.history.action,
        from = result.from().map_or("none", |s| s.as_str()),
        to = result.to().as_str(),
        actor = %result.history.actor,
        "Persisted transition"
    );
    Ok(())
}
