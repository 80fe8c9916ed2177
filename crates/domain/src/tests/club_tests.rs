// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::{date, datetime};

use crate::{
    Club, DomainError, HalfHour, validate_booking_window, validate_cancellation,
};

use super::helpers::{TEST_DATE, hours, saigon_club, utc_club};

#[test]
fn test_club_rejects_unknown_timezone() {
    let result = Club::new(
        1,
        "Nowhere",
        "Mars/Olympus_Mons",
        HalfHour::MIDNIGHT,
        HalfHour::END_OF_DAY,
    );
    assert!(matches!(result, Err(DomainError::InvalidTimezone(_))));
}

#[test]
fn test_club_rejects_inverted_hours() {
    let result = Club::new(
        1,
        "Backwards",
        "UTC",
        HalfHour::from_hours(22.0).unwrap(),
        HalfHour::from_hours(10.0).unwrap(),
    );
    assert!(matches!(result, Err(DomainError::InvalidOperatingHours(_))));
}

#[test]
fn test_range_outside_operating_hours_is_rejected() {
    let club = saigon_club();
    assert!(club.validate_range(&hours(9.0, 23.0)).is_ok());
    assert!(matches!(
        club.validate_range(&hours(8.5, 10.0)),
        Err(DomainError::OutsideOperatingHours { .. })
    ));
    assert!(matches!(
        club.validate_range(&hours(22.0, 23.5)),
        Err(DomainError::OutsideOperatingHours { .. })
    ));
}

#[test]
fn test_local_moment_uses_club_timezone() {
    let club = saigon_club();
    // 11:45 UTC is 18:45 in Ho Chi Minh City
    let moment = club.local_moment(datetime!(2026-10-19 11:45 UTC)).unwrap();
    assert_eq!(moment.date, TEST_DATE);
    assert_eq!(moment.minute_of_day, 18 * 60 + 45);
    assert_eq!(moment.tick().to_string(), "18:30");

    // 20:00 UTC is already the next local day
    let moment = club.local_moment(datetime!(2026-10-19 20:00 UTC)).unwrap();
    assert_eq!(moment.date, date!(2026 - 10 - 20));
}

#[test]
fn test_instant_at_converts_local_tick() {
    let club = saigon_club();
    let instant = club
        .instant_at(TEST_DATE, HalfHour::from_hours(18.5).unwrap())
        .unwrap();
    assert_eq!(instant, datetime!(2026-10-19 11:30 UTC));

    let end_of_day = club.instant_at(TEST_DATE, HalfHour::END_OF_DAY).unwrap();
    assert_eq!(end_of_day, datetime!(2026-10-19 17:00 UTC));
}

#[test]
fn test_booking_window_rejects_fully_past_range() {
    let club = utc_club();
    let now = datetime!(2026-10-19 19:10 UTC);

    assert!(matches!(
        validate_booking_window(&club, TEST_DATE, &hours(18.0, 19.0), now),
        Err(DomainError::RangeInPast { .. })
    ));
    // started but not finished is still bookable
    assert!(validate_booking_window(&club, TEST_DATE, &hours(19.0, 20.0), now).is_ok());
    assert!(validate_booking_window(&club, TEST_DATE, &hours(20.0, 21.0), now).is_ok());
}

#[test]
fn test_booking_window_rejects_start_in_daylight_saving_gap() {
    // London skips 01:00-02:00 on 2026-03-29
    let club = Club::new(
        3,
        "Camden Break",
        "Europe/London",
        HalfHour::MIDNIGHT,
        HalfHour::END_OF_DAY,
    )
    .unwrap();
    let spring_forward = date!(2026 - 03 - 29);
    let now = datetime!(2026-03-28 12:00 UTC);

    assert_eq!(
        validate_booking_window(&club, spring_forward, &hours(1.0, 2.0), now),
        Err(DomainError::NonexistentLocalTime {
            date: spring_forward,
            hour: String::from("01:00")
        })
    );
    assert!(matches!(
        validate_booking_window(&club, spring_forward, &hours(1.5, 3.0), now),
        Err(DomainError::NonexistentLocalTime { .. })
    ));
    assert!(validate_booking_window(&club, spring_forward, &hours(0.0, 0.5), now).is_ok());
    assert!(validate_booking_window(&club, spring_forward, &hours(2.0, 3.0), now).is_ok());
}

#[test]
fn test_cancellation_cutoff_is_one_hour() {
    let starts_at = datetime!(2026-10-19 18:00 UTC);

    assert!(validate_cancellation(starts_at, datetime!(2026-10-19 16:30 UTC)).is_ok());
    assert!(validate_cancellation(starts_at, datetime!(2026-10-19 17:00 UTC)).is_ok());
    assert_eq!(
        validate_cancellation(starts_at, datetime!(2026-10-19 17:30 UTC)),
        Err(DomainError::CancellationWindowClosed {
            minutes_until_start: 30
        })
    );
}
