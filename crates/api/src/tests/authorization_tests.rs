// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authorization tests.
//!
//! Customers may book for themselves, read and cancel their own bookings,
//! and check availability. Everything else is staff-only.

use cuebook_domain::BookingStatus;

use super::helpers::{
    NOON, RecordingPublisher, book_as_customer, create_book_request, create_other_customer,
    create_test_customer, create_test_staff, setup_test_persistence,
};
use crate::{
    ApiError, AuthError, OpenTableRequest, RevenueRequest, Role, authenticate, book_table,
    cancel_booking, check_in, check_out, confirm_booking, dashboard_stats, get_booking,
    open_table, preview_booking, revenue_by_time,
};

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>, expected_action: &str) {
    match result {
        Err(ApiError::Unauthorized { action, .. }) => assert_eq!(action, expected_action),
        other => panic!("expected Unauthorized for {expected_action}, got {other:?}"),
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[test]
fn test_authenticate_parses_role() {
    let actor = authenticate("staff-9", "staff").unwrap();
    assert_eq!(actor.role, Role::Staff);
    assert!(actor.is_staff());

    let actor = authenticate(" user-3 ", "User").unwrap();
    assert_eq!(actor.id, "user-3");
    assert_eq!(actor.role, Role::User);
}

#[test]
fn test_authenticate_rejects_missing_identity() {
    assert!(matches!(
        authenticate("", "staff"),
        Err(AuthError::AuthenticationFailed { .. })
    ));
    assert!(matches!(
        authenticate("user-1", "owner"),
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

// ============================================================================
// Staff-only operations
// ============================================================================

#[test]
fn test_customer_cannot_run_staff_operations() {
    let mut persistence = setup_test_persistence(1);
    let publisher = RecordingPublisher::default();
    let customer = create_test_customer();
    let booking_id = book_as_customer(&mut persistence, 18.0, 19.0)
        .booking
        .booking_id;

    assert_unauthorized(
        confirm_booking(&mut persistence, &publisher, &customer, booking_id, NOON),
        "confirm_booking",
    );
    assert_unauthorized(
        check_in(&mut persistence, &publisher, &customer, booking_id, NOON),
        "check_in",
    );
    assert_unauthorized(
        check_out(&mut persistence, &publisher, &customer, booking_id, NOON),
        "check_out",
    );
    assert_unauthorized(
        preview_booking(&mut persistence, &customer, booking_id, NOON),
        "preview_booking",
    );
    assert_unauthorized(
        open_table(
            &mut persistence,
            &publisher,
            &customer,
            OpenTableRequest {
                club_id: 1,
                table_type: String::from("pool"),
                table_number: None,
                user_id: None,
                end_hour: None,
                idempotency_key: None,
            },
            NOON,
        ),
        "open_table",
    );
    assert_unauthorized(
        dashboard_stats(&mut persistence, &customer, 1, NOON),
        "dashboard_stats",
    );
    assert_unauthorized(
        revenue_by_time(
            &mut persistence,
            &customer,
            &RevenueRequest {
                club_id: 1,
                period: String::from("day"),
                from: None,
                to: None,
            },
        ),
        "revenue_by_time",
    );

    assert!(publisher.events().is_empty());
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_customer_cannot_book_for_someone_else() {
    let mut persistence = setup_test_persistence(1);
    let mut request = create_book_request(18.0, 19.0);
    request.user_id = Some(String::from("user-2"));

    assert_unauthorized(
        book_table(
            &mut persistence,
            &RecordingPublisher::default(),
            &create_test_customer(),
            request.clone(),
            NOON,
        ),
        "book_for_other_user",
    );

    let response = book_table(
        &mut persistence,
        &RecordingPublisher::default(),
        &create_test_staff(),
        request,
        NOON,
    )
    .unwrap();
    assert_eq!(response.booking.user_id.as_deref(), Some("user-2"));
    assert_eq!(response.booking.created_by, "staff-1");
}

#[test]
fn test_only_owner_or_staff_may_cancel() {
    let mut persistence = setup_test_persistence(2);
    let publisher = RecordingPublisher::default();
    let first = book_as_customer(&mut persistence, 18.0, 19.0)
        .booking
        .booking_id;
    let second = book_as_customer(&mut persistence, 20.0, 21.0)
        .booking
        .booking_id;

    assert_unauthorized(
        cancel_booking(
            &mut persistence,
            &publisher,
            &create_other_customer(),
            first,
            NOON,
        ),
        "cancel_booking",
    );

    let by_owner =
        cancel_booking(&mut persistence, &publisher, &create_test_customer(), first, NOON)
            .unwrap();
    assert_eq!(by_owner.booking.status, BookingStatus::Cancelled);

    let by_staff =
        cancel_booking(&mut persistence, &publisher, &create_test_staff(), second, NOON).unwrap();
    assert_eq!(by_staff.booking.status, BookingStatus::Cancelled);
}

#[test]
fn test_only_owner_or_staff_may_read_a_booking() {
    let mut persistence = setup_test_persistence(1);
    let booking_id = book_as_customer(&mut persistence, 18.0, 19.0)
        .booking
        .booking_id;

    assert!(get_booking(&mut persistence, &create_test_customer(), booking_id).is_ok());
    assert!(get_booking(&mut persistence, &create_test_staff(), booking_id).is_ok());
    assert_unauthorized(
        get_booking(&mut persistence, &create_other_customer(), booking_id),
        "view_booking",
    );
}
