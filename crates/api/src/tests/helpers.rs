// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;

use cuebook::{BookingEvent, Publisher, Topic};
use cuebook_domain::{Club, HalfHour, Rate, Table, TableType};
use cuebook_persistence::{Persistence, RegistrySeed};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{AuthenticatedActor, BookTableRequest, BookingWriteResponse, Role, book_table};

pub const NOON: OffsetDateTime = datetime!(2026-10-19 12:00 UTC);

pub const TEST_DATE: &str = "2026-10-19";

/// Collects every published event.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(Topic, BookingEvent)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<(Topic, BookingEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &Topic, event: &BookingEvent) {
        self.events
            .lock()
            .unwrap()
            .push((topic.clone(), event.clone()));
    }
}

pub fn create_test_staff() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("staff-1"), Role::Staff)
}

pub fn create_test_customer() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("user-1"), Role::User)
}

pub fn create_other_customer() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("user-2"), Role::User)
}

/// Club 1 ("Corner Pocket", UTC, 08:00 to midnight) with `pool_tables`
/// pool tables at 50,000/h.
pub fn setup_test_persistence(pool_tables: i32) -> Persistence {
    let club = Club::new(
        1,
        "Corner Pocket",
        "UTC",
        HalfHour::from_hours(8.0).unwrap(),
        HalfHour::END_OF_DAY,
    )
    .unwrap();
    let seed = RegistrySeed {
        clubs: vec![club],
        tables: (1..=pool_tables)
            .map(|number| Table::new(1, number, TableType::Pool))
            .collect(),
        rates: vec![Rate::new(1, TableType::Pool, 50_000).unwrap()],
    };

    let mut persistence = Persistence::new_in_memory().expect("Failed to open store");
    persistence
        .seed_registry(&seed)
        .expect("Failed to seed registry");
    persistence
}

pub fn create_book_request(start_hour: f64, end_hour: f64) -> BookTableRequest {
    BookTableRequest {
        club_id: 1,
        table_type: String::from("pool"),
        booking_date: String::from(TEST_DATE),
        start_hour,
        end_hour,
        user_id: None,
        note: None,
        idempotency_key: None,
    }
}

/// Books `[start, end)` on the test date as the test customer.
pub fn book_as_customer(
    persistence: &mut Persistence,
    start_hour: f64,
    end_hour: f64,
) -> BookingWriteResponse {
    book_table(
        persistence,
        &RecordingPublisher::default(),
        &create_test_customer(),
        create_book_request(start_hour, end_hour),
        NOON,
    )
    .expect("Failed to book table")
}
