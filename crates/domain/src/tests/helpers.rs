// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

use crate::{Booking, BookingStatus, Club, HalfHour, TableType, TimeRange};

pub fn hours(start: f64, end: f64) -> TimeRange {
    TimeRange::from_hours(start, end).unwrap()
}

/// A club open 08:00-24:00 in UTC.
pub fn utc_club() -> Club {
    Club::new(
        1,
        "Corner Pocket",
        "UTC",
        HalfHour::from_hours(8.0).unwrap(),
        HalfHour::END_OF_DAY,
    )
    .unwrap()
}

/// A club open 09:00-23:00 in Asia/Ho_Chi_Minh (UTC+7, no DST).
pub fn saigon_club() -> Club {
    Club::new(
        2,
        "Saigon Cue",
        "Asia/Ho_Chi_Minh",
        HalfHour::from_hours(9.0).unwrap(),
        HalfHour::from_hours(23.0).unwrap(),
    )
    .unwrap()
}

pub const TEST_DATE: Date = date!(2026 - 10 - 19);

pub fn booking(id: i64, range: TimeRange, status: BookingStatus) -> Booking {
    Booking {
        booking_id: id,
        club_id: 1,
        table_type: TableType::Pool,
        assigned_table: None,
        user_id: Some(String::from("user-1")),
        booking_date: TEST_DATE,
        start: range.start(),
        end: Some(range.end()),
        is_walk_in: false,
        status,
        rate_per_hour: 50_000,
        total_amount: None,
        check_in_at: None,
        check_out_at: None,
        cancelled_at: None,
        note: None,
        idempotency_key: None,
        created_by: String::from("user-1"),
        created_at: datetime!(2026-10-18 12:00 UTC),
    }
}

pub fn completed(id: i64, amount: i64, check_out_at: OffsetDateTime) -> Booking {
    let mut b = booking(id, hours(18.0, 19.0), BookingStatus::Completed);
    b.total_amount = Some(amount);
    b.check_out_at = Some(check_out_at);
    b
}
