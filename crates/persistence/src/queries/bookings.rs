// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.
//!
//! `load_partition` is the read half of every write: the adapter calls it
//! inside `BEGIN IMMEDIATE` so the capacity check and the insert that
//! follows see the same rows.

use cuebook::Partition;
use cuebook_domain::{Booking, BookingStatus, Club, TableType};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Date;

use crate::data_models::{BookingRow, HistoryRecord, HistoryRow, date_to_column};
use crate::diesel_schema::{booking_history, bookings};
use crate::error::PersistenceError;
use crate::queries::registry::{find_rate, list_tables};

fn active_statuses() -> Vec<&'static str> {
    BookingStatus::ACTIVE.iter().map(BookingStatus::as_str).collect()
}

fn into_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, PersistenceError> {
    rows.into_iter().map(BookingRow::into_booking).collect()
}

/// Looks up a booking by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn find_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(BookingRow::into_booking)
        .transpose()
}

/// Looks up the booking an actor created under an idempotency key.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn find_booking_by_idempotency_key(
    conn: &mut SqliteConnection,
    created_by: &str,
    key: &str,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::created_by.eq(created_by))
        .filter(bookings::idempotency_key.eq(key))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(BookingRow::into_booking)
        .transpose()
}

/// Loads everything a transition needs for one `(club, type, date)`.
///
/// Bookings are the active ones on `date`. Seated tables come from every
/// checked-in booking of the type regardless of date, so a session that
/// ran past midnight still holds its table.
///
/// # Errors
///
/// Returns an error if any query fails or a stored row is invalid.
pub fn load_partition(
    conn: &mut SqliteConnection,
    club: Club,
    table_type: TableType,
    date: Date,
) -> Result<Partition, PersistenceError> {
    let club_id: i64 = club.id();
    let mut partition: Partition = Partition::new(club, table_type, date);

    partition.tables = list_tables(conn, club_id, Some(table_type))?;
    partition.rate_per_hour = find_rate(conn, club_id, table_type)?.map(|rate| rate.price_per_hour);

    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::club_id.eq(club_id))
        .filter(bookings::table_type.eq(table_type.as_str()))
        .filter(bookings::booking_date.eq(date_to_column(date)?))
        .filter(bookings::status.eq_any(active_statuses()))
        .select(BookingRow::as_select())
        .order(bookings::booking_id.asc())
        .load::<BookingRow>(conn)?;
    partition.bookings = into_bookings(rows)?;

    partition.checked_in_tables = bookings::table
        .filter(bookings::club_id.eq(club_id))
        .filter(bookings::table_type.eq(table_type.as_str()))
        .filter(bookings::status.eq(BookingStatus::CheckedIn.as_str()))
        .select(bookings::assigned_table_number)
        .load::<Option<i32>>(conn)?
        .into_iter()
        .flatten()
        .collect();

    Ok(partition)
}

/// Lists every booking of a club ordered by date, start, and ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_club_bookings(
    conn: &mut SqliteConnection,
    club_id: i64,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::club_id.eq(club_id))
        .select(BookingRow::as_select())
        .order((
            bookings::booking_date.asc(),
            bookings::start_tick.asc(),
            bookings::booking_id.asc(),
        ))
        .load::<BookingRow>(conn)?;
    into_bookings(rows)
}

/// Lists pending and confirmed bookings dated on or before `date`.
///
/// ISO dates order lexically, so the comparison runs on the text column.
/// Callers still check each candidate against its club's clock.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_unseated_bookings_until(
    conn: &mut SqliteConnection,
    date: Date,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::status.eq_any([
            BookingStatus::Pending.as_str(),
            BookingStatus::Confirmed.as_str(),
        ]))
        .filter(bookings::booking_date.le(date_to_column(date)?))
        .select(BookingRow::as_select())
        .order((bookings::booking_date.asc(), bookings::start_tick.asc()))
        .load::<BookingRow>(conn)?;
    into_bookings(rows)
}

/// Lists the recorded transitions of a booking in order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_booking_history(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<HistoryRecord>, PersistenceError> {
    booking_history::table
        .filter(booking_history::booking_id.eq(booking_id))
        .select(HistoryRow::as_select())
        .order(booking_history::history_id.asc())
        .load::<HistoryRow>(conn)?
        .into_iter()
        .map(HistoryRow::into_record)
        .collect()
}
