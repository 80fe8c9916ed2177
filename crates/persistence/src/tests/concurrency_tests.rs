// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Multi-connection tests against one database file.
//!
//! Each thread owns its own connection, so the only thing serializing the
//! writers is `SQLite`'s write lock.

use crate::tests::helpers::{
    NOON, create_booking_command, create_test_customer, create_test_seed, hours,
};
use crate::{CreateOutcome, Persistence, TransactionError};
use cuebook::CoreError;
use cuebook_domain::{DomainError, TimeRange};
use std::path::Path;
use std::thread;
use std::time::Duration;

const WRITERS: usize = 4;

fn book_with_retry(
    path: &Path,
    range: TimeRange,
) -> Result<CreateOutcome, TransactionError<CoreError>> {
    let mut persistence = Persistence::new_with_file(path).unwrap();
    let mut attempt: u32 = 0;
    loop {
        let result = persistence.create_booking(
            1,
            create_booking_command(range, None),
            create_test_customer(),
            NOON,
        );
        match result {
            Err(err) if err.is_transient() && attempt < 10 => {
                attempt += 1;
                thread::sleep(Duration::from_millis(10 * u64::from(attempt)));
            }
            other => return other,
        }
    }
}

#[test]
fn test_parallel_writers_never_double_book_the_last_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence.seed_registry(&create_test_seed(1)).unwrap();
    }

    let results: Vec<Result<CreateOutcome, TransactionError<CoreError>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|_| scope.spawn(|| book_with_retry(&path, hours(18.0, 19.0))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let created = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(TransactionError::Aborted(CoreError::DomainViolation(
                    DomainError::NoTableAvailable { .. }
                )))
            )
        })
        .count();

    assert_eq!(created, 1);
    assert_eq!(refused, WRITERS - 1);

    let mut reader = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reader.list_club_bookings(1).unwrap().len(), 1);
}

#[test]
fn test_parallel_writers_fill_but_never_exceed_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fill.db");
    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence.seed_registry(&create_test_seed(3)).unwrap();
    }

    let created: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS * 2)
            .map(|_| scope.spawn(|| book_with_retry(&path, hours(20.0, 21.0))))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count()
    });

    assert_eq!(created, 3);
}
