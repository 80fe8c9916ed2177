// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, RegistrySeed};
use cuebook::{Actor, ActorKind, Command};
use cuebook_domain::{Club, HalfHour, Rate, Table, TableType, TimeRange};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const TEST_DATE: Date = date!(2026 - 10 - 19);

pub const NOON: OffsetDateTime = datetime!(2026-10-19 12:00 UTC);

pub fn hours(start: f64, end: f64) -> TimeRange {
    TimeRange::from_hours(start, end).unwrap()
}

/// One UTC club open 08:00 to midnight with `pool_tables` pool tables at
/// 50,000/h and one snooker table without a rate.
pub fn create_test_seed(pool_tables: i32) -> RegistrySeed {
    let club = Club::new(
        1,
        "Corner Pocket",
        "UTC",
        HalfHour::from_hours(8.0).unwrap(),
        HalfHour::END_OF_DAY,
    )
    .unwrap();

    let mut tables: Vec<Table> = (1..=pool_tables)
        .map(|number| Table::new(1, number, TableType::Pool))
        .collect();
    tables.push(Table::new(1, pool_tables + 1, TableType::Snooker));

    RegistrySeed {
        clubs: vec![club],
        tables,
        rates: vec![Rate::new(1, TableType::Pool, 50_000).unwrap()],
    }
}

pub fn create_test_persistence(pool_tables: i32) -> Persistence {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence
        .seed_registry(&create_test_seed(pool_tables))
        .unwrap();
    persistence
}

pub fn create_test_staff() -> Actor {
    Actor::new("staff-1", ActorKind::Staff)
}

pub fn create_test_customer() -> Actor {
    Actor::new("user-1", ActorKind::User)
}

pub fn create_booking_command(range: TimeRange, idempotency_key: Option<&str>) -> Command {
    Command::CreateBooking {
        table_type: TableType::Pool,
        date: TEST_DATE,
        range,
        user_id: Some(String::from("user-1")),
        note: Some(String::from("birthday")),
        idempotency_key: idempotency_key.map(String::from),
    }
}

/// Creates a booking and returns its ID.
pub fn book(persistence: &mut Persistence, range: TimeRange) -> i64 {
    persistence
        .create_booking(
            1,
            create_booking_command(range, None),
            create_test_customer(),
            NOON,
        )
        .unwrap()
        .booking()
        .booking_id
}
