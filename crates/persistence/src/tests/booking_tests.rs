// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store-level lifecycle tests.
//!
//! These run the full write path (partition load, transition, insert or
//! compare-and-swap, history, table hint) against an in-memory database.

use crate::mutations::bookings::update_booking_if_status;
use crate::tests::helpers::{
    NOON, TEST_DATE, book, create_booking_command, create_test_customer, create_test_persistence,
    create_test_staff, hours,
};
use crate::{CreateOutcome, PersistenceError, TransactionError};
use cuebook::{ActorKind, BookingEvent, Command, CoreError};
use cuebook_domain::{BookingStatus, DomainError, TableStatus, TableType};
use time::macros::datetime;

#[test]
fn test_create_booking_persists_pending_booking_and_history() {
    let mut persistence = create_test_persistence(2);

    let outcome = persistence
        .create_booking(
            1,
            create_booking_command(hours(18.0, 19.0), None),
            create_test_customer(),
            NOON,
        )
        .unwrap();

    let booking_id = outcome.booking().booking_id;
    assert!(booking_id > 0);

    let stored = persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
    assert_eq!(stored.rate_per_hour, 50_000);
    assert_eq!(stored.booking_date, TEST_DATE);
    assert_eq!(stored.note.as_deref(), Some("birthday"));
    assert_eq!(stored.created_at, NOON);

    let history = persistence.get_booking_history(booking_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "CreateBooking");
    assert_eq!(history[0].from_status, None);
    assert_eq!(history[0].to_status, BookingStatus::Pending);
    assert_eq!(history[0].actor_kind, ActorKind::User);

    let events = outcome.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        BookingEvent::BookingUpdated { booking_id: id, .. } if id == booking_id
    ));
}

#[test]
fn test_capacity_is_enforced_by_the_store() {
    let mut persistence = create_test_persistence(2);
    book(&mut persistence, hours(18.0, 19.0));
    book(&mut persistence, hours(18.5, 19.5));

    let third = persistence.create_booking(
        1,
        create_booking_command(hours(18.5, 19.0), None),
        create_test_customer(),
        NOON,
    );

    assert_eq!(
        third,
        Err(TransactionError::Aborted(CoreError::DomainViolation(
            DomainError::NoTableAvailable {
                table_type: String::from("pool")
            }
        )))
    );

    let availability = persistence
        .check_availability(1, TableType::Pool, TEST_DATE, &hours(18.5, 19.0))
        .unwrap();
    assert_eq!(availability.available, 0);
    assert_eq!(availability.total, 2);
}

#[test]
fn test_idempotency_key_replays_without_writing() {
    let mut persistence = create_test_persistence(2);
    let command = create_booking_command(hours(18.0, 19.0), Some("req-42"));

    let first = persistence
        .create_booking(1, command.clone(), create_test_customer(), NOON)
        .unwrap();
    let second = persistence
        .create_booking(1, command, create_test_customer(), NOON)
        .unwrap();

    assert!(!first.is_replay());
    assert!(second.is_replay());
    assert_eq!(second.booking().booking_id, first.booking().booking_id);
    assert!(second.events().is_empty());
    assert_eq!(persistence.list_club_bookings(1).unwrap().len(), 1);
}

#[test]
fn test_idempotency_key_is_scoped_to_the_creating_actor() {
    let mut persistence = create_test_persistence(2);
    let other = cuebook::Actor::new("user-2", ActorKind::User);

    let first = persistence
        .create_booking(
            1,
            create_booking_command(hours(18.0, 19.0), Some("k1")),
            create_test_customer(),
            NOON,
        )
        .unwrap();
    let second = persistence
        .create_booking(
            1,
            Command::CreateBooking {
                table_type: TableType::Pool,
                date: TEST_DATE,
                range: hours(20.0, 21.0),
                user_id: Some(String::from("user-2")),
                note: None,
                idempotency_key: Some(String::from("k1")),
            },
            other,
            NOON,
        )
        .unwrap();

    assert!(!second.is_replay());
    assert_ne!(second.booking().booking_id, first.booking().booking_id);
    assert_eq!(second.booking().user_id.as_deref(), Some("user-2"));
    assert_eq!(second.booking().note, None);
    assert_eq!(persistence.list_club_bookings(1).unwrap().len(), 2);
}

#[test]
fn test_idempotency_key_reused_for_different_request_is_rejected() {
    let mut persistence = create_test_persistence(2);
    let first = persistence
        .create_booking(
            1,
            create_booking_command(hours(18.0, 19.0), Some("req-42")),
            create_test_customer(),
            NOON,
        )
        .unwrap();

    let result = persistence.create_booking(
        1,
        create_booking_command(hours(20.0, 21.0), Some("req-42")),
        create_test_customer(),
        NOON,
    );

    assert!(matches!(
        result,
        Err(TransactionError::Aborted(CoreError::IdempotencyKeyReused { booking_id, .. }))
            if booking_id == first.booking().booking_id
    ));
    assert_eq!(persistence.list_club_bookings(1).unwrap().len(), 1);
}

#[test]
fn test_unknown_club_is_not_found() {
    let mut persistence = create_test_persistence(2);

    let result = persistence.create_booking(
        9,
        create_booking_command(hours(18.0, 19.0), None),
        create_test_customer(),
        NOON,
    );

    assert_eq!(
        result,
        Err(TransactionError::Aborted(CoreError::ClubNotFound(9)))
    );
}

#[test]
fn test_missing_rate_rejects_booking() {
    let mut persistence = create_test_persistence(2);
    let command = Command::CreateBooking {
        table_type: TableType::Snooker,
        date: TEST_DATE,
        range: hours(18.0, 19.0),
        user_id: None,
        note: None,
        idempotency_key: None,
    };

    assert_eq!(
        persistence.create_booking(1, command, create_test_staff(), NOON),
        Err(TransactionError::Aborted(CoreError::RateNotFound {
            club_id: 1,
            table_type: TableType::Snooker
        }))
    );
}

#[test]
fn test_full_lifecycle_updates_table_hint_and_bills() {
    let mut persistence = create_test_persistence(2);
    let booking_id = book(&mut persistence, hours(18.0, 19.0));

    persistence
        .transition_booking(
            booking_id,
            Command::Confirm,
            create_test_staff(),
            datetime!(2026-10-19 12:05 UTC),
        )
        .unwrap();
    let seated = persistence
        .transition_booking(
            booking_id,
            Command::CheckIn,
            create_test_staff(),
            datetime!(2026-10-19 18:00 UTC),
        )
        .unwrap();
    assert_eq!(seated.booking.assigned_table, Some(1));

    let tables = persistence.list_tables(1, Some(TableType::Pool)).unwrap();
    assert_eq!(tables[0].status, TableStatus::Occupied);

    let preview = persistence
        .preview_end_play(booking_id, datetime!(2026-10-19 19:12 UTC))
        .unwrap();
    assert_eq!(preview.amount, 75_000);

    let done = persistence
        .transition_booking(
            booking_id,
            Command::EndPlay,
            create_test_staff(),
            datetime!(2026-10-19 19:12 UTC),
        )
        .unwrap();
    assert_eq!(done.booking.total_amount, Some(75_000));

    let stored = persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Completed);
    assert_eq!(stored.check_out_at, Some(datetime!(2026-10-19 19:12 UTC)));

    let tables = persistence.list_tables(1, Some(TableType::Pool)).unwrap();
    assert_eq!(tables[0].status, TableStatus::Available);

    let statuses: Vec<BookingStatus> = persistence
        .get_booking_history(booking_id)
        .unwrap()
        .iter()
        .map(|h| h.to_status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::Completed
        ]
    );
}

#[test]
fn test_cancellation_releases_capacity() {
    let mut persistence = create_test_persistence(1);
    let booking_id = book(&mut persistence, hours(18.0, 19.0));

    persistence
        .transition_booking(
            booking_id,
            Command::Cancel,
            create_test_customer(),
            datetime!(2026-10-19 13:00 UTC),
        )
        .unwrap();

    let availability = persistence
        .check_availability(1, TableType::Pool, TEST_DATE, &hours(18.0, 19.0))
        .unwrap();
    assert_eq!(availability.available, 1);
}

#[test]
fn test_rejected_transition_leaves_booking_untouched() {
    let mut persistence = create_test_persistence(1);
    let booking_id = book(&mut persistence, hours(18.0, 19.0));

    let result = persistence.transition_booking(
        booking_id,
        Command::Cancel,
        create_test_customer(),
        datetime!(2026-10-19 17:30 UTC),
    );

    assert!(matches!(
        result,
        Err(TransactionError::Aborted(CoreError::DomainViolation(
            DomainError::CancellationWindowClosed { .. }
        )))
    ));
    let stored = persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
    assert_eq!(persistence.get_booking_history(booking_id).unwrap().len(), 1);
}

#[test]
fn test_unknown_booking_is_not_found() {
    let mut persistence = create_test_persistence(1);

    assert_eq!(
        persistence.transition_booking(77, Command::Confirm, create_test_staff(), NOON),
        Err(TransactionError::Aborted(CoreError::BookingNotFound(77)))
    );
    assert_eq!(
        persistence.preview_end_play(77, NOON),
        Err(TransactionError::Aborted(CoreError::BookingNotFound(77)))
    );
}

#[test]
fn test_compare_and_swap_detects_stale_status() {
    let mut persistence = create_test_persistence(1);
    let booking_id = book(&mut persistence, hours(18.0, 19.0));
    let mut booking = persistence.get_booking(booking_id).unwrap().unwrap();
    booking.status = BookingStatus::Confirmed;

    let result = update_booking_if_status(&mut persistence.conn, &booking, BookingStatus::Confirmed);

    assert_eq!(
        result,
        Err(PersistenceError::StaleWrite {
            booking_id,
            expected: String::from("confirmed")
        })
    );
    assert!(result.unwrap_err().is_transient());
}

#[test]
fn test_walk_in_lands_on_club_local_date() {
    let mut persistence = create_test_persistence(1);
    let now = datetime!(2026-10-19 14:10 UTC);

    let outcome = persistence
        .create_booking(
            1,
            Command::OpenNow {
                table_type: TableType::Pool,
                table_number: None,
                user_id: None,
                end: None,
                idempotency_key: Some(String::from("walk-1")),
            },
            create_test_staff(),
            now,
        )
        .unwrap();

    let CreateOutcome::Created(result) = outcome else {
        panic!("expected a new walk-in");
    };
    assert_eq!(result.booking.booking_date, TEST_DATE);
    assert_eq!(result.booking.status, BookingStatus::CheckedIn);
    assert_eq!(result.booking.assigned_table, Some(1));

    // the open session holds the only table until close
    let evening = persistence
        .check_availability(1, TableType::Pool, TEST_DATE, &hours(21.0, 22.0))
        .unwrap();
    assert_eq!(evening.available, 0);
}

#[test]
fn test_unseated_booking_candidates() {
    let mut persistence = create_test_persistence(3);
    let early = book(&mut persistence, hours(18.0, 19.0));
    let later = book(&mut persistence, hours(20.0, 21.0));
    let seated = book(&mut persistence, hours(18.0, 19.0));
    persistence
        .transition_booking(later, Command::Confirm, create_test_staff(), NOON)
        .unwrap();
    persistence
        .transition_booking(
            seated,
            Command::CheckIn,
            create_test_staff(),
            datetime!(2026-10-19 18:00 UTC),
        )
        .unwrap();

    let candidates: Vec<i64> = persistence
        .list_unseated_bookings_until(TEST_DATE)
        .unwrap()
        .iter()
        .map(|b| b.booking_id)
        .collect();
    assert_eq!(candidates, vec![early, later]);

    let expired = persistence
        .transition_booking(
            early,
            Command::ExpirePending,
            cuebook::Actor::system(),
            datetime!(2026-10-19 18:01 UTC),
        )
        .unwrap();
    assert_eq!(expired.booking.status, BookingStatus::Cancelled);

    let remaining: Vec<i64> = persistence
        .list_unseated_bookings_until(TEST_DATE)
        .unwrap()
        .iter()
        .map(|b| b.booking_id)
        .collect();
    assert_eq!(remaining, vec![later]);
}
