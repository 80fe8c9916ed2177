// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Mutations use Diesel DSL, with `last_insert_rowid()` from the `backend`
//! module as the only raw SQL.
//!
//! ## Module Organization
//!
//! - `registry`: Club, table, and rate upserts and table status hints
//! - `bookings`: Booking inserts, compare-and-swap updates, history, and
//!   the `persist_transition` orchestration

pub mod bookings;
pub mod registry;

pub use bookings::persist_transition;
pub use registry::{set_table_status, upsert_club, upsert_rate, upsert_table};
