// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the cuebook table booking engine.
//!
//! This crate stores the club registry, bookings, and booking history in
//! `SQLite` through Diesel, and runs every lifecycle transition inside a
//! single database transaction.
//!
//! ## Write Discipline
//!
//! Every write opens `BEGIN IMMEDIATE`, which takes the database write lock
//! up front. Inside it the adapter:
//!
//! 1. Checks the idempotency key (creations only)
//! 2. Loads the `(club, type, date)` partition
//! 3. Runs the pure transition from the `cuebook` crate
//! 4. Inserts the booking, or updates it by compare-and-swap on `status`
//! 5. Appends the history row and the table status hint
//!
//! Two writers therefore never decide capacity against the same snapshot.
//! Lock waits past the busy timeout surface as `PersistenceError::Busy`; a
//! compare-and-swap miss as `PersistenceError::StaleWrite`. Both are
//! transient and safe to retry.
//!
//! ## Storage
//!
//! - In-memory databases (tests) use a unique shared-cache URI per adapter
//! - File databases run in WAL mode with a busy timeout, so several
//!   connections may share one file
//! - Migrations are embedded and run on open
//! - Foreign key enforcement is verified at startup
//!
//! Events are not stored here. Callers publish `TransitionResult::events`
//! after the transaction has committed.

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

use cuebook::{
    Actor, BookingEvent, Command, CoreError, Partition, TransitionResult, apply, apply_create,
    preview_end_play,
};
use cuebook_domain::{
    Availability, Billing, Booking, Club, Rate, Table, TableType, TimeRange,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::BUSY_TIMEOUT_MS;
pub use data_models::{HistoryRecord, RegistrySeed};
pub use error::{PersistenceError, TransactionError};

use backend::PersistenceBackend;

/// Result of a create operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new booking was stored.
    Created(TransitionResult),
    /// The idempotency key was already used; this is the booking it created.
    Replayed(Booking),
}

impl CreateOutcome {
    /// The stored booking.
    #[must_use]
    pub const fn booking(&self) -> &Booking {
        match self {
            Self::Created(result) => &result.booking,
            Self::Replayed(booking) => booking,
        }
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub const fn is_replay(&self) -> bool {
        matches!(self, Self::Replayed(_))
    }

    /// Events to publish. A replay publishes nothing.
    #[must_use]
    pub fn events(&self) -> Vec<BookingEvent> {
        match self {
            Self::Created(result) => result.events(),
            Self::Replayed(_) => Vec::new(),
        }
    }
}

/// Persistence adapter for the booking engine.
///
/// One adapter owns one connection. Callers that share an adapter across
/// tasks wrap it in a mutex; callers that need parallel writers open one
/// adapter per task on the same database file.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:cuebook_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(&shared_memory_url, None)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(path_str, Some(BUSY_TIMEOUT_MS))?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Loads a registry seed in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any row is rejected; nothing is written then.
    pub fn seed_registry(&mut self, seed: &RegistrySeed) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            for club in &seed.clubs {
                mutations::upsert_club(conn, club)?;
            }
            for table in &seed.tables {
                mutations::upsert_table(conn, table)?;
            }
            for rate in &seed.rates {
                mutations::upsert_rate(conn, rate)?;
            }
            Ok::<(), PersistenceError>(())
        })?;

        info!(
            clubs = seed.clubs.len(),
            tables = seed.tables.len(),
            rates = seed.rates.len(),
            "Seeded registry"
        );
        Ok(())
    }

    /// Inserts or replaces a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn upsert_club(&mut self, club: &Club) -> Result<(), PersistenceError> {
        mutations::upsert_club(&mut self.conn, club)
    }

    /// Inserts or replaces a physical table.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or the club does not exist.
    pub fn upsert_table(&mut self, table: &Table) -> Result<(), PersistenceError> {
        mutations::upsert_table(&mut self.conn, table)
    }

    /// Inserts or replaces a rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or the club does not exist.
    pub fn upsert_rate(&mut self, rate: &Rate) -> Result<(), PersistenceError> {
        mutations::upsert_rate(&mut self.conn, rate)
    }

    /// Looks up a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_club(&mut self, club_id: i64) -> Result<Option<Club>, PersistenceError> {
        queries::find_club(&mut self.conn, club_id)
    }

    /// Lists every club.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_clubs(&mut self) -> Result<Vec<Club>, PersistenceError> {
        queries::list_clubs(&mut self.conn)
    }

    /// Lists the physical tables of a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tables(
        &mut self,
        club_id: i64,
        table_type: Option<TableType>,
    ) -> Result<Vec<Table>, PersistenceError> {
        queries::list_tables(&mut self.conn, club_id, table_type)
    }

    /// Looks up the current rate of a table type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_rate(
        &mut self,
        club_id: i64,
        table_type: TableType,
    ) -> Result<Option<Rate>, PersistenceError> {
        queries::find_rate(&mut self.conn, club_id, table_type)
    }

    // ========================================================================
    // Bookings (reads)
    // ========================================================================

    /// Looks up a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, PersistenceError> {
        queries::find_booking(&mut self.conn, booking_id)
    }

    /// Lists the history of a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking_history(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<HistoryRecord>, PersistenceError> {
        queries::list_booking_history(&mut self.conn, booking_id)
    }

    /// Lists every booking of a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_club_bookings(&mut self, club_id: i64) -> Result<Vec<Booking>, PersistenceError> {
        queries::list_club_bookings(&mut self.conn, club_id)
    }

    /// Lists pending and confirmed bookings dated on or before `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_unseated_bookings_until(
        &mut self,
        date: Date,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::list_unseated_bookings_until(&mut self.conn, date)
    }

    /// Computes availability of a table type over a range.
    ///
    /// Runs in a read transaction so the table count and the bookings come
    /// from one snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` if the club is unknown or the range lies outside
    /// its operating hours, or `Persistence` if the store fails.
    pub fn check_availability(
        &mut self,
        club_id: i64,
        table_type: TableType,
        date: Date,
        range: &TimeRange,
    ) -> Result<Availability, TransactionError<CoreError>> {
        self.conn.transaction(|conn| {
            let club: Club = queries::find_club(conn, club_id)?
                .ok_or(TransactionError::Aborted(CoreError::ClubNotFound(club_id)))?;
            club.validate_range(range)
                .map_err(|e| TransactionError::Aborted(CoreError::from(e)))?;
            let partition: Partition = queries::load_partition(conn, club, table_type, date)?;
            Ok(partition.availability(range))
        })
    }

    // ========================================================================
    // Bookings (transitions)
    // ========================================================================

    /// Creates a booking or a walk-in session.
    ///
    /// `command` must be `CreateBooking` or `OpenNow`. A walk-in lands on
    /// the club-local date of `now`. Idempotency keys are scoped to the
    /// creating actor: if the actor already used the key for the same
    /// request, the booking it created is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` if the transition is rejected or the actor reused
    /// the key for a different request, or `Persistence` if the store fails
    /// or is busy.
    pub fn create_booking(
        &mut self,
        club_id: i64,
        command: Command,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<CreateOutcome, TransactionError<CoreError>> {
        let (table_type, requested_date, idempotency_key) = match &command {
            Command::CreateBooking {
                table_type,
                date,
                idempotency_key,
                ..
            } => (*table_type, Some(*date), idempotency_key.clone()),
            Command::OpenNow {
                table_type,
                idempotency_key,
                ..
            } => (*table_type, None, idempotency_key.clone()),
            other => {
                return Err(TransactionError::Aborted(CoreError::Internal(format!(
                    "{} does not create a booking",
                    other.name()
                ))));
            }
        };

        let created_by: String = actor.id.clone();
        let outcome: CreateOutcome = self
            .conn
            .immediate_transaction::<_, TransactionError<CoreError>, _>(|conn| {
                if let Some(key) = idempotency_key.as_deref()
                    && let Some(existing) =
                        queries::find_booking_by_idempotency_key(conn, &created_by, key)?
                {
                    if existing.club_id != club_id || !command.is_replay_of(&existing) {
                        return Err(TransactionError::Aborted(CoreError::IdempotencyKeyReused {
                            key: key.to_string(),
                            booking_id: existing.booking_id,
                        }));
                    }
                    return Ok(CreateOutcome::Replayed(existing));
                }

                let club: Club = queries::find_club(conn, club_id)?
                    .ok_or(TransactionError::Aborted(CoreError::ClubNotFound(club_id)))?;
                let date: Date = match requested_date {
                    Some(date) => date,
                    None => {
                        club.local_moment(now)
                            .map_err(|e| TransactionError::Aborted(CoreError::from(e)))?
                            .date
                    }
                };

                let partition: Partition = queries::load_partition(conn, club, table_type, date)?;
                let mut result: TransitionResult = apply_create(&partition, command, actor, now)
                    .map_err(TransactionError::Aborted)?;
                mutations::persist_transition(conn, &mut result)?;
                Ok(CreateOutcome::Created(result))
            })?;

        if outcome.is_replay() {
            debug!(
                booking_id = outcome.booking().booking_id,
                "Idempotency key replayed"
            );
        }
        Ok(outcome)
    }

    /// Applies a command to an existing booking.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` if the booking is unknown or the transition is
    /// rejected, or `Persistence` if the store fails, is busy, or the
    /// booking changed concurrently.
    pub fn transition_booking(
        &mut self,
        booking_id: i64,
        command: Command,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, TransactionError<CoreError>> {
        self.conn.immediate_transaction(|conn| {
            let booking: Booking = queries::find_booking(conn, booking_id)?
                .ok_or(TransactionError::Aborted(CoreError::BookingNotFound(booking_id)))?;
            let club: Club = queries::find_club(conn, booking.club_id)?.ok_or(
                TransactionError::Aborted(CoreError::ClubNotFound(booking.club_id)),
            )?;
            let partition: Partition =
                queries::load_partition(conn, club, booking.table_type, booking.booking_date)?;

            let mut result: TransitionResult =
                apply(&partition, &booking, command, actor, now).map_err(TransactionError::Aborted)?;
            mutations::persist_transition(conn, &mut result)?;
            Ok(result)
        })
    }

    /// Computes what ending a session now would bill, without writing.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` if the booking is unknown or not checked in, or
    /// `Persistence` if the store fails.
    pub fn preview_end_play(
        &mut self,
        booking_id: i64,
        now: OffsetDateTime,
    ) -> Result<Billing, TransactionError<CoreError>> {
        let booking: Booking = queries::find_booking(&mut self.conn, booking_id)?
            .ok_or(TransactionError::Aborted(CoreError::BookingNotFound(booking_id)))?;
        preview_end_play(&booking, now).map_err(TransactionError::Aborted)
    }
}
