// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability calculation.
//!
//! Availability is derived, never stored: it is the table count of a type
//! minus the number of active bookings whose occupied range overlaps the
//! requested range. Keeping `available >= 1` as the admission condition for
//! every new booking guarantees that, at any instant, the number of active
//! bookings covering that instant never exceeds the table count.

use crate::slot::TimeRange;
use crate::types::Table;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Result of an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Tables of the type that are free for the whole range.
    pub available: u32,
    /// Physical tables of the type in the club.
    pub total: u32,
}

impl Availability {
    /// Returns true if at least one more booking can be admitted.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.available > 0
    }
}

/// Calculates availability for a requested range.
///
/// # Arguments
///
/// * `total_tables` - Number of physical tables of the type
/// * `occupied` - Occupied ranges of the active bookings in the partition
/// * `requested` - The range being asked about
#[must_use]
pub fn calculate_availability<I>(total_tables: u32, occupied: I, requested: &TimeRange) -> Availability
where
    I: IntoIterator<Item = TimeRange>,
{
    let overlapping: usize = occupied
        .into_iter()
        .filter(|range| range.overlaps(requested))
        .count();
    let overlapping: u32 = overlapping.to_u32().unwrap_or(u32::MAX);

    Availability {
        available: total_tables.saturating_sub(overlapping),
        total: total_tables,
    }
}

/// Picks the lowest-numbered table that is not in `in_use`.
#[must_use]
pub fn pick_free_table(tables: &[Table], in_use: &[i32]) -> Option<i32> {
    tables
        .iter()
        .map(|table| table.table_number)
        .filter(|number| !in_use.contains(number))
        .min()
}
