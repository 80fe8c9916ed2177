// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Expiry sweep tests for pending and unseated confirmed bookings.

use cuebook::{ActorKind, BookingEvent};
use cuebook_domain::BookingStatus;
use time::macros::datetime;

use super::helpers::{
    NOON, RecordingPublisher, TEST_DATE, book_as_customer, create_book_request,
    create_test_customer, create_test_staff, setup_test_persistence,
};
use crate::{
    CheckAvailabilityRequest, ExpirySummary, book_table, check_available_tables, check_in,
    confirm_booking, expire_pending_bookings, get_booking,
};

#[test]
fn test_sweep_cancels_pending_booking_once_started() {
    let mut persistence = setup_test_persistence(2);
    let staff = create_test_staff();
    let pending = book_as_customer(&mut persistence, 18.0, 19.0)
        .booking
        .booking_id;
    let confirmed = book_as_customer(&mut persistence, 18.0, 19.0)
        .booking
        .booking_id;
    confirm_booking(
        &mut persistence,
        &RecordingPublisher::default(),
        &staff,
        confirmed,
        NOON,
    )
    .unwrap();
    let publisher = RecordingPublisher::default();

    let summary = expire_pending_bookings(
        &mut persistence,
        &publisher,
        datetime!(2026-10-19 18:00 UTC),
    )
    .unwrap();

    assert_eq!(
        summary,
        ExpirySummary {
            inspected: 2,
            expired: 1,
            released: 0,
            skipped: 0
        }
    );

    let detail = get_booking(&mut persistence, &staff, pending).unwrap();
    assert_eq!(detail.booking.status, BookingStatus::Cancelled);
    let last = detail.history.last().unwrap();
    assert_eq!(last.action, "ExpirePending");
    assert_eq!(last.actor_kind, ActorKind::System);

    let untouched = get_booking(&mut persistence, &staff, confirmed).unwrap();
    assert_eq!(untouched.booking.status, BookingStatus::Confirmed);

    assert!(publisher.events().iter().any(|(_, event)| matches!(
        event,
        BookingEvent::BookingUpdated {
            status: BookingStatus::Cancelled,
            ..
        }
    )));
}

#[test]
fn test_sweep_leaves_future_bookings_alone() {
    let mut persistence = setup_test_persistence(2);
    book_as_customer(&mut persistence, 18.0, 19.0);

    let mut tomorrow = create_book_request(10.0, 11.0);
    tomorrow.booking_date = String::from("2026-10-20");
    book_table(
        &mut persistence,
        &RecordingPublisher::default(),
        &create_test_customer(),
        tomorrow,
        NOON,
    )
    .unwrap();
    let publisher = RecordingPublisher::default();

    let summary = expire_pending_bookings(
        &mut persistence,
        &publisher,
        datetime!(2026-10-19 17:59 UTC),
    )
    .unwrap();

    assert_eq!(summary.inspected, 2);
    assert_eq!(summary.expired, 0);
    assert!(publisher.events().is_empty());
}

#[test]
fn test_sweep_is_idempotent() {
    let mut persistence = setup_test_persistence(1);
    book_as_customer(&mut persistence, 18.0, 19.0);
    let at = datetime!(2026-10-19 18:30 UTC);

    let first = expire_pending_bookings(&mut persistence, &RecordingPublisher::default(), at)
        .unwrap();
    let second = expire_pending_bookings(&mut persistence, &RecordingPublisher::default(), at)
        .unwrap();

    assert_eq!(first.expired, 1);
    assert_eq!(second, ExpirySummary::default());
}

#[test]
fn test_sweep_releases_confirmed_no_show_after_its_end() {
    let mut persistence = setup_test_persistence(1);
    let staff = create_test_staff();
    let no_show = book_as_customer(&mut persistence, 18.0, 19.0)
        .booking
        .booking_id;
    confirm_booking(
        &mut persistence,
        &RecordingPublisher::default(),
        &staff,
        no_show,
        NOON,
    )
    .unwrap();

    let during = expire_pending_bookings(
        &mut persistence,
        &RecordingPublisher::default(),
        datetime!(2026-10-19 18:45 UTC),
    )
    .unwrap();
    assert_eq!(during.released, 0);

    let publisher = RecordingPublisher::default();
    let after = expire_pending_bookings(
        &mut persistence,
        &publisher,
        datetime!(2026-10-19 19:00 UTC),
    )
    .unwrap();
    assert_eq!(
        after,
        ExpirySummary {
            inspected: 1,
            expired: 0,
            released: 1,
            skipped: 0
        }
    );

    let detail = get_booking(&mut persistence, &staff, no_show).unwrap();
    assert_eq!(detail.booking.status, BookingStatus::Cancelled);
    let last = detail.history.last().unwrap();
    assert_eq!(last.action, "ReleaseNoShow");
    assert_eq!(last.actor_kind, ActorKind::System);
    assert!(publisher.events().iter().any(|(_, event)| matches!(
        event,
        BookingEvent::AvailabilityChanged { .. }
    )));

    let seated_late = check_in(
        &mut persistence,
        &RecordingPublisher::default(),
        &staff,
        no_show,
        datetime!(2026-10-19 19:05 UTC),
    );
    assert!(seated_late.is_err());

    let availability = check_available_tables(
        &mut persistence,
        &create_test_customer(),
        1,
        &CheckAvailabilityRequest {
            table_type: String::from("pool"),
            date: String::from(TEST_DATE),
            start: 18.0,
            end: 19.0,
        },
    )
    .unwrap();
    assert_eq!(availability.available, 1);
}
