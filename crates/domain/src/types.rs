// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of billiards table. Capacity and pricing are partitioned by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    /// Pool table.
    Pool,
    /// Carom table.
    Carom,
    /// Snooker table.
    Snooker,
}

impl TableType {
    /// All table types, in display order.
    pub const ALL: [Self; 3] = [Self::Pool, Self::Carom, Self::Snooker];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pool => "pool",
            Self::Carom => "carom",
            Self::Snooker => "snooker",
        }
    }
}

impl FromStr for TableType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pool" => Ok(Self::Pool),
            "carom" => Ok(Self::Carom),
            "snooker" => Ok(Self::Snooker),
            _ => Err(DomainError::InvalidTableType(s.to_string())),
        }
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cached physical status of a table.
///
/// This is a display hint only. Capacity decisions are always derived from
/// the booking store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Nobody is playing.
    #[default]
    Available,
    /// Held for an upcoming booking.
    Reserved,
    /// A session is in progress.
    Occupied,
}

impl TableStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Occupied => "occupied",
        }
    }
}

impl FromStr for TableStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "occupied" => Ok(Self::Occupied),
            _ => Err(DomainError::InvalidTableStatus(s.to_string())),
        }
    }
}

/// A physical table in a club, identified by `(club_id, table_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// The owning club.
    pub club_id: i64,
    /// The table number, unique within the club.
    pub table_number: i32,
    /// The table type.
    pub table_type: TableType,
    /// Cached status hint.
    #[serde(default)]
    pub status: TableStatus,
}

impl Table {
    /// Creates an available table.
    #[must_use]
    pub const fn new(club_id: i64, table_number: i32, table_type: TableType) -> Self {
        Self {
            club_id,
            table_number,
            table_type,
            status: TableStatus::Available,
        }
    }
}

/// Hourly price for a table type in a club, in currency minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The club.
    pub club_id: i64,
    /// The table type.
    pub table_type: TableType,
    /// Price per hour, in minor units.
    pub price_per_hour: i64,
}

impl Rate {
    /// Creates a rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative.
    pub const fn new(
        club_id: i64,
        table_type: TableType,
        price_per_hour: i64,
    ) -> Result<Self, DomainError> {
        if price_per_hour < 0 {
            return Err(DomainError::InvalidRate(price_per_hour));
        }
        Ok(Self {
            club_id,
            table_type,
            price_per_hour,
        })
    }
}
