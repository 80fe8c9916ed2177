// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod availability;
mod billing;
mod booking;
mod booking_status;
mod club;
mod error;
mod formats;
mod reporting;
mod slot;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use availability::{Availability, calculate_availability, pick_free_table};
pub use billing::{BILLING_UNIT, Billing, billable_duration, compute_amount};
pub use booking::Booking;
pub use booking_status::BookingStatus;
pub use club::{Club, LocalMoment};
pub use error::DomainError;
pub use formats::{ISO_DATE, iso_date, parse_iso_date};
pub use reporting::{
    DashboardStats, RevenueBucket, RevenuePeriod, dashboard_stats, revenue_by_time, revenue_date,
};
pub use slot::{HalfHour, MINUTES_PER_TICK, TimeRange};
pub use types::{Rate, Table, TableStatus, TableType};
pub use validation::{CANCELLATION_CUTOFF, validate_booking_window, validate_cancellation};
