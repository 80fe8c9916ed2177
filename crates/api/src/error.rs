// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use cuebook::CoreError;
use cuebook_domain::DomainError;
use cuebook_persistence::{PersistenceError, TransactionError};
use thiserror::Error;
use tracing::error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A booking rule rejected the request in the current state.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Another writer won; the request may be retried as-is.
    #[error("Concurrent update: {message}")]
    TransientConflict {
        /// A description of the contention.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns true if the same request may succeed when retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientConflict { .. })
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn invalid_input(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn rule_violation(rule: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::InvalidHalfHour(_)
        | DomainError::InvalidRange { .. }
        | DomainError::OutsideOperatingHours { .. } => invalid_input("time_range", &err),
        DomainError::RangeInPast { .. } | DomainError::NonexistentLocalTime { .. } => {
            invalid_input("booking_date", &err)
        }
        DomainError::DateConversion(_) => invalid_input("date", &err),
        DomainError::InvalidTableType(_) => invalid_input("table_type", &err),
        DomainError::InvalidTableStatus(_) => invalid_input("table_status", &err),
        DomainError::InvalidBookingStatus(_) => invalid_input("status", &err),
        DomainError::InvalidReportingPeriod(_) => invalid_input("period", &err),
        DomainError::InvalidRate(_) => invalid_input("price_per_hour", &err),
        DomainError::InvalidTransition { .. } => rule_violation("booking_lifecycle", &err),
        DomainError::NoTableAvailable { .. } => rule_violation("table_capacity", &err),
        DomainError::TableOccupied { .. } => rule_violation("table_free", &err),
        DomainError::CheckInOutsideBookingDate { .. } => rule_violation("check_in_date", &err),
        DomainError::CancellationWindowClosed { .. } => rule_violation("cancellation_cutoff", &err),
        DomainError::InvalidDuration { .. } => rule_violation("billable_duration", &err),
        DomainError::TableNotFound { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Table"),
            message: err.to_string(),
        },
        DomainError::InvalidOperatingHours(_)
        | DomainError::InvalidTimezone(_)
        | DomainError::AmountOverflow => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::BookingNotFound(booking_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        },
        CoreError::ClubNotFound(club_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Club"),
            message: format!("Club {club_id} does not exist"),
        },
        CoreError::RateNotFound {
            club_id,
            table_type,
        } => ApiError::ResourceNotFound {
            resource_type: String::from("Rate"),
            message: format!("No {table_type} rate configured for club {club_id}"),
        },
        CoreError::NotExpired { booking_id } => ApiError::DomainRuleViolation {
            rule: String::from("pending_expiry"),
            message: format!("Booking {booking_id} is not yet due to expire"),
        },
        err @ CoreError::IdempotencyKeyReused { .. } => ApiError::DomainRuleViolation {
            rule: String::from("idempotency_key"),
            message: err.to_string(),
        },
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Lock contention and compare-and-swap misses become `TransientConflict`;
/// every other storage fault is logged and reported as internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    if err.is_transient() {
        return ApiError::TransientConflict {
            message: err.to_string(),
        };
    }
    if let PersistenceError::NotFound(message) = err {
        return ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        };
    }
    error!(error = %err, "Persistence error");
    ApiError::Internal {
        message: format!("Persistence error: {err}"),
    }
}

/// Translates the failure of a transactional store operation.
#[must_use]
pub fn translate_transaction_error(err: TransactionError<CoreError>) -> ApiError {
    match err {
        TransactionError::Persistence(err) => translate_persistence_error(err),
        TransactionError::Aborted(err) => translate_core_error(err),
    }
}
