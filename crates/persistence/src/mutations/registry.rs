// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registry upserts.

use cuebook_domain::{Club, Rate, Table, TableStatus};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::tick_to_column;
use crate::diesel_schema::{club_tables, clubs, rates};
use crate::error::PersistenceError;

/// Inserts or replaces a club.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub fn upsert_club(conn: &mut SqliteConnection, club: &Club) -> Result<(), PersistenceError> {
    let open: i32 = tick_to_column(club.open());
    let close: i32 = tick_to_column(club.close());

    diesel::insert_into(clubs::table)
        .values((
            clubs::club_id.eq(club.id()),
            clubs::name.eq(club.name()),
            clubs::timezone.eq(club.timezone()),
            clubs::open_tick.eq(open),
            clubs::close_tick.eq(close),
        ))
        .on_conflict(clubs::club_id)
        .do_update()
        .set((
            clubs::name.eq(club.name()),
            clubs::timezone.eq(club.timezone()),
            clubs::open_tick.eq(open),
            clubs::close_tick.eq(close),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("upsert_club: {e}")))?;

    debug!(club_id = club.id(), "Upserted club");
    Ok(())
}

/// Inserts or replaces a physical table.
///
/// # Errors
///
/// Returns an error if the statement fails or the club does not exist.
pub fn upsert_table(conn: &mut SqliteConnection, table: &Table) -> Result<(), PersistenceError> {
    diesel::insert_into(club_tables::table)
        .values((
            club_tables::club_id.eq(table.club_id),
            club_tables::table_number.eq(table.table_number),
            club_tables::table_type.eq(table.table_type.as_str()),
            club_tables::status.eq(table.status.as_str()),
        ))
        .on_conflict((club_tables::club_id, club_tables::table_number))
        .do_update()
        .set((
            club_tables::table_type.eq(table.table_type.as_str()),
            club_tables::status.eq(table.status.as_str()),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("upsert_table: {e}")))?;

    debug!(
        club_id = table.club_id,
        table_number = table.table_number,
        "Upserted table"
    );
    Ok(())
}

/// Inserts or replaces the hourly rate of a table type.
///
/// Existing bookings keep the rate they were created with.
///
/// # Errors
///
/// Returns an error if the statement fails or the club does not exist.
pub fn upsert_rate(conn: &mut SqliteConnection, rate: &Rate) -> Result<(), PersistenceError> {
    diesel::insert_into(rates::table)
        .values((
            rates::club_id.eq(rate.club_id),
            rates::table_type.eq(rate.table_type.as_str()),
            rates::price_per_hour.eq(rate.price_per_hour),
        ))
        .on_conflict((rates::club_id, rates::table_type))
        .do_update()
        .set(rates::price_per_hour.eq(rate.price_per_hour))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("upsert_rate: {e}")))?;

    debug!(
        club_id = rate.club_id,
        table_type = rate.table_type.as_str(),
        price_per_hour = rate.price_per_hour,
        "Upserted rate"
    );
    Ok(())
}

/// Updates the cached status of a physical table.
///
/// The status is advisory; capacity is always derived from bookings.
///
/// # Errors
///
/// Returns an error if the statement fails or the table does not exist.
pub fn set_table_status(
    conn: &mut SqliteConnection,
    club_id: i64,
    table_number: i32,
    status: TableStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        club_tables::table
            .filter(club_tables::club_id.eq(club_id))
            .filter(club_tables::table_number.eq(table_number)),
    )
    .set(club_tables::status.eq(status.as_str()))
    .execute(conn)
    .map_err(|e| PersistenceError::QueryFailed(format!("set_table_status: {e}")))?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "table {table_number} in club {club_id}"
        )));
    }
    Ok(())
}
