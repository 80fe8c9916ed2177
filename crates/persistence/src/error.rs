// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// A stored row could not be turned back into a domain value.
    ReconstructionError(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The database was locked by another writer past the busy timeout.
    Busy(String),
    /// A compare-and-swap update found the booking in a different status.
    StaleWrite {
        /// The booking.
        booking_id: i64,
        /// The status the writer expected.
        expected: String,
    },
    /// The requested resource was not found.
    NotFound(String),
}

impl PersistenceError {
    /// Returns true for errors a caller may retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::StaleWrite { .. })
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::ReconstructionError(msg) => write!(f, "Row reconstruction error: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::Busy(msg) => write!(f, "Database busy: {msg}"),
            Self::StaleWrite {
                booking_id,
                expected,
            } => write!(
                f,
                "Booking {booking_id} is no longer {expected}; concurrent update"
            ),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match &err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(_, info) if is_lock_message(info.message()) => {
                Self::Busy(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// `SQLITE_BUSY` and `SQLITE_LOCKED` surface from diesel as unknown database
/// errors carrying the `sqlite3_errmsg` text.
fn is_lock_message(message: &str) -> bool {
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("database is busy")
}

/// Failure of a store operation that runs domain logic inside a transaction.
///
/// `Aborted` carries the domain/core error that made the closure roll the
/// transaction back; `Persistence` carries a storage fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError<E> {
    /// The store failed.
    Persistence(PersistenceError),
    /// The transaction was rolled back by a rule violation.
    Aborted(E),
}

impl<E> TransactionError<E> {
    /// Returns true if retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Persistence(err) => err.is_transient(),
            Self::Aborted(_) => false,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransactionError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Aborted(err) => write!(f, "{err}"),
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for TransactionError<E> {}

impl<E> From<PersistenceError> for TransactionError<E> {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

impl<E> From<diesel::result::Error> for TransactionError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Persistence(err.into())
    }
}
