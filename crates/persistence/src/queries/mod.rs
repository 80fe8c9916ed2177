// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `registry`: Clubs, physical tables, and rates
//! - `bookings`: Bookings, partitions, and booking history
//!
//! Every function takes `&mut SqliteConnection` so it can run either on its
//! own or inside a write transaction opened by the `Persistence` adapter.

pub mod bookings;
pub mod registry;

pub use bookings::{
    find_booking, find_booking_by_idempotency_key, list_booking_history, list_club_bookings,
    list_unseated_bookings_until, load_partition,
};
pub use registry::{find_club, find_rate, list_clubs, list_tables};
