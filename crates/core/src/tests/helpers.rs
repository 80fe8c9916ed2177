// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Actor, ActorKind, Command, Partition, apply_create};
use cuebook_domain::{Booking, Club, HalfHour, Table, TableType, TimeRange};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const TEST_DATE: Date = date!(2026 - 10 - 19);

/// Noon on the test date; well before the evening ranges used below.
pub const NOON: OffsetDateTime = datetime!(2026-10-19 12:00 UTC);

pub fn hours(start: f64, end: f64) -> TimeRange {
    TimeRange::from_hours(start, end).unwrap()
}

pub fn create_test_club() -> Club {
    Club::new(
        1,
        "Corner Pocket",
        "UTC",
        HalfHour::from_hours(8.0).unwrap(),
        HalfHour::END_OF_DAY,
    )
    .unwrap()
}

pub fn create_test_staff() -> Actor {
    Actor::new("staff-1", ActorKind::Staff)
}

pub fn create_test_customer() -> Actor {
    Actor::new("user-1", ActorKind::User)
}

/// A pool partition on the test date with `table_count` tables at 50,000/h.
pub fn create_test_partition(table_count: i32) -> Partition {
    let mut partition = Partition::new(create_test_club(), TableType::Pool, TEST_DATE);
    partition.tables = (1..=table_count)
        .map(|number| Table::new(1, number, TableType::Pool))
        .collect();
    partition.rate_per_hour = Some(50_000);
    partition
}

pub fn create_booking_command(range: TimeRange) -> Command {
    Command::CreateBooking {
        table_type: TableType::Pool,
        date: TEST_DATE,
        range,
        user_id: Some(String::from("user-1")),
        note: None,
        idempotency_key: None,
    }
}

/// Admits a booking into the partition the way the store would.
pub fn admit(partition: &mut Partition, booking_id: i64, range: TimeRange) -> Booking {
    let mut booking = apply_create(
        partition,
        create_booking_command(range),
        create_test_customer(),
        NOON,
    )
    .unwrap()
    .booking;
    booking.booking_id = booking_id;
    partition.bookings.push(booking.clone());
    booking
}
