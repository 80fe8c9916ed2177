// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests carry raw strings and numbers exactly as clients send them;
//! handlers validate and parse them before touching the store. Responses
//! carry typed values with stable JSON shapes.

use cuebook_domain::{
    Booking, BookingStatus, DashboardStats, HalfHour, RevenueBucket, RevenuePeriod, TableType,
    iso_date,
};
use cuebook_persistence::HistoryRecord;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// API request to reserve a table type for a future range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookTableRequest {
    /// The club.
    pub club_id: i64,
    /// Table type (`pool`, `carom`, `snooker`).
    pub table_type: String,
    /// Club-local date (`YYYY-MM-DD`).
    pub booking_date: String,
    /// Start hour on the half-hour grid (e.g. `18.5`).
    pub start_hour: f64,
    /// End hour on the half-hour grid, exclusive.
    pub end_hour: f64,
    /// The customer; defaults to the caller for customers.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Client-supplied retry key.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// API request to check how many tables of a type are free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckAvailabilityRequest {
    /// Table type.
    #[serde(rename = "type")]
    pub table_type: String,
    /// Club-local date (`YYYY-MM-DD`).
    pub date: String,
    /// Start hour.
    pub start: f64,
    /// End hour, exclusive.
    pub end: f64,
}

/// API request to open a walk-in session now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTableRequest {
    /// The club.
    pub club_id: i64,
    /// Table type.
    pub table_type: String,
    /// A specific physical table.
    #[serde(default)]
    pub table_number: Option<i32>,
    /// The customer, if known.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Planned end hour; absent plays until ended.
    #[serde(default)]
    pub end_hour: Option<f64>,
    /// Client-supplied retry key.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// API request for the revenue report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueRequest {
    /// The club.
    #[serde(rename = "clubId", alias = "club_id")]
    pub club_id: i64,
    /// `day`, `week`, or `month`.
    pub period: String,
    /// First date to include (`YYYY-MM-DD`).
    #[serde(default)]
    pub from: Option<String>,
    /// Last date to include (`YYYY-MM-DD`).
    #[serde(default)]
    pub to: Option<String>,
}

/// A booking as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking_id: i64,
    pub club_id: i64,
    pub table_type: TableType,
    pub assigned_table: Option<i32>,
    pub user_id: Option<String>,
    #[serde(with = "iso_date")]
    pub booking_date: Date,
    pub start_hour: HalfHour,
    pub end_hour: Option<HalfHour>,
    pub is_walk_in: bool,
    pub status: BookingStatus,
    pub rate_per_hour: i64,
    pub total_amount: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_in_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_out_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
    pub note: Option<String>,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id,
            club_id: booking.club_id,
            table_type: booking.table_type,
            assigned_table: booking.assigned_table,
            user_id: booking.user_id.clone(),
            booking_date: booking.booking_date,
            start_hour: booking.start,
            end_hour: booking.end,
            is_walk_in: booking.is_walk_in,
            status: booking.status,
            rate_per_hour: booking.rate_per_hour,
            total_amount: booking.total_amount,
            check_in_at: booking.check_in_at,
            check_out_at: booking.check_out_at,
            cancelled_at: booking.cancelled_at,
            note: booking.note.clone(),
            created_by: booking.created_by.clone(),
            created_at: booking.created_at,
        }
    }
}

/// API response for any write on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWriteResponse {
    /// The booking after the write.
    pub booking: BookingResponse,
    /// True if an idempotency key matched and nothing was written.
    pub replayed: bool,
    /// A success message.
    pub message: String,
}

/// API response for a single booking with its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetailResponse {
    /// The booking.
    pub booking: BookingResponse,
    /// Recorded transitions, oldest first.
    pub history: Vec<HistoryRecord>,
}

/// API response for an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub club_id: i64,
    pub table_type: TableType,
    #[serde(with = "iso_date")]
    pub booking_date: Date,
    pub start_hour: HalfHour,
    pub end_hour: HalfHour,
    /// Tables still free over the whole range.
    pub available: u32,
    /// Physical tables of the type.
    pub total: u32,
}

/// API response for a bill preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub booking_id: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_in_at: Option<OffsetDateTime>,
    /// The instant the preview was computed for.
    #[serde(with = "time::serde::rfc3339")]
    pub as_of: OffsetDateTime,
    pub billed_units: i64,
    pub billed_hours: f64,
    pub rate_per_hour: i64,
    pub amount: i64,
}

/// API response for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStatsResponse {
    pub club_id: i64,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

/// API response for the revenue report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueResponse {
    pub club_id: i64,
    pub period: RevenuePeriod,
    pub buckets: Vec<RevenueBucket>,
    /// Sum over all buckets.
    pub total_revenue: i64,
}

/// Outcome of one sweep of unseated bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirySummary {
    /// Pending and confirmed bookings inspected.
    pub inspected: usize,
    /// Pending bookings cancelled by this sweep.
    pub expired: usize,
    /// Confirmed bookings released because nobody checked in.
    pub released: usize,
    /// Candidates skipped because another writer got there first.
    pub skipped: usize,
}
