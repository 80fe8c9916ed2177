// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Mutex;

use crate::tests::helpers::{NOON, admit, create_test_partition, create_test_staff, hours};
use crate::{BookingEvent, Command, Publisher, Topic, apply, publish_all};
use cuebook_domain::{BookingStatus, TableType};
use serde_json::json;
use time::macros::datetime;

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<(Topic, BookingEvent)>>,
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &Topic, event: &BookingEvent) {
        self.published
            .lock()
            .unwrap()
            .push((topic.clone(), event.clone()));
    }
}

#[test]
fn test_topic_is_scoped_to_club() {
    assert_eq!(Topic::club(7).as_str(), "club:7");
    assert_eq!(Topic::club(7).to_string(), "club:7");
}

#[test]
fn test_creation_emits_update_and_availability() {
    let mut partition = create_test_partition(2);
    admit(&mut partition, 42, hours(18.0, 19.0));
    let result = crate::apply_create(
        &partition,
        crate::tests::helpers::create_booking_command(hours(20.0, 21.0)),
        create_test_staff(),
        NOON,
    )
    .unwrap();

    let events = result.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], BookingEvent::BookingUpdated { .. }));
    assert!(matches!(
        events[1],
        BookingEvent::AvailabilityChanged {
            table_type: TableType::Pool,
            ..
        }
    ));
}

#[test]
fn test_confirm_emits_only_booking_updated() {
    let mut partition = create_test_partition(2);
    let booking = admit(&mut partition, 42, hours(18.0, 19.0));
    let result = apply(
        &partition,
        &booking,
        Command::Confirm,
        create_test_staff(),
        datetime!(2026-10-19 12:30 UTC),
    )
    .unwrap();

    let events = result.events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        BookingEvent::BookingUpdated {
            club_id: 1,
            booking_id: 42,
            status: BookingStatus::Confirmed,
            booking_date: crate::tests::helpers::TEST_DATE,
            start_hour: booking.start,
            end_hour: booking.end,
        }
    );
}

#[test]
fn test_event_wire_format() {
    let mut partition = create_test_partition(2);
    let booking = admit(&mut partition, 42, hours(18.5, 20.0));
    let result = apply(
        &partition,
        &booking,
        Command::Cancel,
        create_test_staff(),
        datetime!(2026-10-19 12:30 UTC),
    )
    .unwrap();
    let events = result.events();

    assert_eq!(
        serde_json::to_value(&events[0]).unwrap(),
        json!({
            "type": "booking_updated",
            "club_id": 1,
            "booking_id": 42,
            "status": "cancelled",
            "booking_date": "2026-10-19",
            "start_hour": 18.5,
            "end_hour": 20.0,
        })
    );
    assert_eq!(
        serde_json::to_value(&events[1]).unwrap(),
        json!({
            "type": "availability_changed",
            "club_id": 1,
            "table_type": "pool",
            "booking_date": "2026-10-19",
            "start_hour": 18.5,
            "end_hour": 20.0,
        })
    );

    let parsed: BookingEvent =
        serde_json::from_value(serde_json::to_value(&events[1]).unwrap()).unwrap();
    assert_eq!(parsed, events[1]);
}

#[test]
fn test_publish_all_routes_to_club_topic() {
    let mut partition = create_test_partition(2);
    let booking = admit(&mut partition, 42, hours(18.0, 19.0));
    let result = apply(
        &partition,
        &booking,
        Command::Cancel,
        create_test_staff(),
        datetime!(2026-10-19 12:30 UTC),
    )
    .unwrap();
    let publisher = RecordingPublisher::default();

    publish_all(&publisher, &result.events());

    let published = publisher.published.lock().unwrap();
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|(topic, _)| topic.as_str() == "club:1"));
}
