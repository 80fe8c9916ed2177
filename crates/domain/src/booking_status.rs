// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking status tracking and transition logic.
//!
//! Status only ever moves forward along
//! `pending -> confirmed -> checked-in -> completed`, or from a non-terminal
//! state to `cancelled`. `completed` and `cancelled` are terminal.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    /// Created, awaiting payment confirmation.
    Pending,
    /// Payment confirmed.
    Confirmed,
    /// Player is at the table.
    CheckedIn,
    /// Session ended and billed.
    Completed,
    /// Cancelled before play.
    Cancelled,
}

impl BookingStatus {
    /// Statuses that hold capacity.
    pub const ACTIVE: [Self; 3] = [Self::Pending, Self::Confirmed, Self::CheckedIn];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked-in",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns true if a booking in this status consumes capacity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::CheckedIn)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the transition moves
    /// backward, stays in place, or leaves a terminal state.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        let valid: bool = match self {
            Self::Pending => matches!(
                new_status,
                Self::Confirmed | Self::CheckedIn | Self::Cancelled
            ),
            Self::Confirmed => matches!(new_status, Self::CheckedIn | Self::Cancelled),
            Self::CheckedIn => matches!(new_status, Self::Completed | Self::Cancelled),
            Self::Completed | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: new_status,
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "checked-in" => Ok(Self::CheckedIn),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidBookingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
