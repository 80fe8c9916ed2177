// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion to and from domain values.
//!
//! Dates are stored as `YYYY-MM-DD`, instants as RFC 3339 text, half-hour
//! ticks as integers `0..=48`, and booleans as `0`/`1` integers.

use cuebook::ActorKind;
use cuebook_domain::{
    Booking, BookingStatus, Club, HalfHour, ISO_DATE, Rate, Table, TableStatus, TableType,
    parse_iso_date,
};
use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

use crate::diesel_schema::{booking_history, bookings, club_tables, clubs, rates};
use crate::error::PersistenceError;

/// Diesel Queryable struct for club rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = clubs)]
pub struct ClubRow {
    pub club_id: i64,
    pub name: String,
    pub timezone: String,
    pub open_tick: i32,
    pub close_tick: i32,
}

impl ClubRow {
    pub fn into_club(self) -> Result<Club, PersistenceError> {
        let club_id: i64 = self.club_id;
        Club::new(
            club_id,
            self.name,
            self.timezone,
            tick_from_column(self.open_tick)?,
            tick_from_column(self.close_tick)?,
        )
        .map_err(|e| PersistenceError::ReconstructionError(format!("club {club_id}: {e}")))
    }
}

/// Diesel Queryable struct for physical table rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = club_tables)]
pub struct TableRow {
    pub club_id: i64,
    pub table_number: i32,
    pub table_type: String,
    pub status: String,
}

impl TableRow {
    pub fn into_table(self) -> Result<Table, PersistenceError> {
        Ok(Table {
            club_id: self.club_id,
            table_number: self.table_number,
            table_type: parse_column::<TableType>(&self.table_type)?,
            status: parse_column::<TableStatus>(&self.status)?,
        })
    }
}

/// Diesel Queryable struct for rate rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = rates)]
pub struct RateRow {
    pub club_id: i64,
    pub table_type: String,
    pub price_per_hour: i64,
}

impl RateRow {
    pub fn into_rate(self) -> Result<Rate, PersistenceError> {
        Rate::new(
            self.club_id,
            parse_column::<TableType>(&self.table_type)?,
            self.price_per_hour,
        )
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
    }
}

/// Diesel Queryable struct for booking rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub struct BookingRow {
    pub booking_id: i64,
    pub club_id: i64,
    pub table_type: String,
    pub assigned_table_number: Option<i32>,
    pub user_id: Option<String>,
    pub booking_date: String,
    pub start_tick: i32,
    pub end_tick: Option<i32>,
    pub is_walk_in: i32,
    pub status: String,
    pub rate_per_hour: i64,
    pub total_amount: Option<i64>,
    pub check_in_at: Option<String>,
    pub check_out_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

impl BookingRow {
    pub fn into_booking(self) -> Result<Booking, PersistenceError> {
        Ok(Booking {
            booking_id: self.booking_id,
            club_id: self.club_id,
            table_type: parse_column::<TableType>(&self.table_type)?,
            assigned_table: self.assigned_table_number,
            user_id: self.user_id,
            booking_date: date_from_column(&self.booking_date)?,
            start: tick_from_column(self.start_tick)?,
            end: self.end_tick.map(tick_from_column).transpose()?,
            is_walk_in: self.is_walk_in != 0,
            status: parse_column::<BookingStatus>(&self.status)?,
            rate_per_hour: self.rate_per_hour,
            total_amount: self.total_amount,
            check_in_at: self.check_in_at.as_deref().map(instant_from_column).transpose()?,
            check_out_at: self.check_out_at.as_deref().map(instant_from_column).transpose()?,
            cancelled_at: self.cancelled_at.as_deref().map(instant_from_column).transpose()?,
            note: self.note,
            idempotency_key: self.idempotency_key,
            created_by: self.created_by,
            created_at: instant_from_column(&self.created_at)?,
        })
    }
}

/// Diesel Queryable struct for booking history rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_history)]
pub struct HistoryRow {
    pub history_id: i64,
    pub booking_id: i64,
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_id: String,
    pub actor_kind: String,
    pub recorded_at: String,
    pub details: Option<String>,
}

/// One recorded transition of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub history_id: i64,
    pub booking_id: i64,
    pub action: String,
    pub from_status: Option<BookingStatus>,
    pub to_status: BookingStatus,
    pub actor_id: String,
    pub actor_kind: ActorKind,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub details: Option<String>,
}

impl HistoryRow {
    pub fn into_record(self) -> Result<HistoryRecord, PersistenceError> {
        Ok(HistoryRecord {
            history_id: self.history_id,
            booking_id: self.booking_id,
            action: self.action,
            from_status: self
                .from_status
                .as_deref()
                .map(parse_column::<BookingStatus>)
                .transpose()?,
            to_status: parse_column::<BookingStatus>(&self.to_status)?,
            actor_id: self.actor_id,
            actor_kind: ActorKind::from_str(&self.actor_kind)
                .map_err(PersistenceError::ReconstructionError)?,
            recorded_at: instant_from_column(&self.recorded_at)?,
            details: self.details,
        })
    }
}

/// Registry contents loaded at startup.
///
/// Club, table, and rate management belong to another service; the engine
/// only needs a copy of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySeed {
    #[serde(default)]
    pub clubs: Vec<Club>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub rates: Vec<Rate>,
}

impl RegistrySeed {
    /// Parses a seed from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or describes an invalid
    /// club or rate.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let seed: Self = serde_json::from_str(json)?;
        for rate in &seed.rates {
            Rate::new(rate.club_id, rate.table_type, rate.price_per_hour)
                .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        }
        Ok(seed)
    }

    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let json: String = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PersistenceError::InitializationError(format!(
                "cannot read seed {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&json)
    }
}

pub fn tick_to_column(tick: HalfHour) -> i32 {
    i32::from(tick.index())
}

pub fn tick_from_column(value: i32) -> Result<HalfHour, PersistenceError> {
    let index: u8 = value
        .to_u8()
        .ok_or_else(|| PersistenceError::ReconstructionError(format!("tick {value}")))?;
    HalfHour::from_index(index).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

pub fn date_to_column(date: Date) -> Result<String, PersistenceError> {
    date.format(ISO_DATE)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn date_from_column(value: &str) -> Result<Date, PersistenceError> {
    parse_iso_date(value).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

pub fn instant_to_column(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    instant
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn instant_from_column(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::ReconstructionError(format!("instant '{value}': {e}")))
}

fn parse_column<T>(value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}
