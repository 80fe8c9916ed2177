// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Boundary layer of the booking engine.
//!
//! Handlers here accept raw request values and an authenticated actor,
//! enforce role rules, call the store, and publish events after commit.
//! Nothing in this crate speaks HTTP; the server maps [`ApiError`] to
//! status codes.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_transaction_error,
};
pub use handlers::{
    RETRY_BACKOFF_MS, book_table, cancel_booking, check_available_tables, check_in, check_out,
    confirm_booking, dashboard_stats, expire_pending_bookings, get_booking, open_table,
    preview_booking, revenue_by_time,
};
pub use request_response::{
    AvailabilityResponse, BookTableRequest, BookingDetailResponse, BookingResponse,
    BookingWriteResponse, CheckAvailabilityRequest, DashboardStatsResponse, ExpirySummary,
    OpenTableRequest, PreviewResponse, RevenueRequest, RevenueResponse,
};
