// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registry queries.
//!
//! Clubs, tables, and rates are owned by another service and copied in at
//! startup; the booking engine only ever reads them here.

use cuebook_domain::{Club, Rate, Table, TableType};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{ClubRow, RateRow, TableRow};
use crate::diesel_schema::{club_tables, clubs, rates};
use crate::error::PersistenceError;

/// Looks up a club by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn find_club(conn: &mut SqliteConnection, club_id: i64) -> Result<Option<Club>, PersistenceError> {
    clubs::table
        .filter(clubs::club_id.eq(club_id))
        .select(ClubRow::as_select())
        .first::<ClubRow>(conn)
        .optional()?
        .map(ClubRow::into_club)
        .transpose()
}

/// Lists every club ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_clubs(conn: &mut SqliteConnection) -> Result<Vec<Club>, PersistenceError> {
    clubs::table
        .select(ClubRow::as_select())
        .order(clubs::club_id.asc())
        .load::<ClubRow>(conn)?
        .into_iter()
        .map(ClubRow::into_club)
        .collect()
}

/// Lists the physical tables of a club, optionally of one type, ordered by
/// table number.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_tables(
    conn: &mut SqliteConnection,
    club_id: i64,
    table_type: Option<TableType>,
) -> Result<Vec<Table>, PersistenceError> {
    let mut query = club_tables::table
        .filter(club_tables::club_id.eq(club_id))
        .select(TableRow::as_select())
        .order(club_tables::table_number.asc())
        .into_boxed();

    if let Some(table_type) = table_type {
        query = query.filter(club_tables::table_type.eq(table_type.as_str()));
    }

    query
        .load::<TableRow>(conn)?
        .into_iter()
        .map(TableRow::into_table)
        .collect()
}

/// Looks up the current hourly rate of a table type.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn find_rate(
    conn: &mut SqliteConnection,
    club_id: i64,
    table_type: TableType,
) -> Result<Option<Rate>, PersistenceError> {
    rates::table
        .filter(rates::club_id.eq(club_id))
        .filter(rates::table_type.eq(table_type.as_str()))
        .select(RateRow::as_select())
        .first::<RateRow>(conn)
        .optional()?
        .map(RateRow::into_rate)
        .transpose()
}
