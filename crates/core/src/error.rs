// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cuebook_domain::{DomainError, TableType};

/// Errors that can occur during booking transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The booking does not exist.
    BookingNotFound(i64),
    /// The club does not exist.
    ClubNotFound(i64),
    /// No rate is configured for the club and table type.
    RateNotFound {
        /// The club.
        club_id: i64,
        /// The table type.
        table_type: TableType,
    },
    /// An unseated booking was asked to expire before it was due.
    NotExpired {
        /// The booking.
        booking_id: i64,
    },
    /// An idempotency key was reused for a different request.
    IdempotencyKeyReused {
        /// The key.
        key: String,
        /// The booking the key already belongs to.
        booking_id: i64,
    },
    /// The command was routed to the wrong entry point or the loaded
    /// partition does not match it.
    Internal(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::BookingNotFound(id) => write!(f, "Booking {id} not found"),
            Self::ClubNotFound(id) => write!(f, "Club {id} not found"),
            Self::RateNotFound {
                club_id,
                table_type,
            } => write!(f, "No rate for {table_type} tables in club {club_id}"),
            Self::NotExpired { booking_id } => {
                write!(f, "Booking {booking_id} is not yet due to expire")
            }
            Self::IdempotencyKeyReused { key, booking_id } => write!(
                f,
                "Idempotency key '{key}' was already used for booking {booking_id} with different details"
            ),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
