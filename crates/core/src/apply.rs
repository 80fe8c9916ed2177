// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::actor::Actor;
use crate::command::Command;
use crate::error::CoreError;
use crate::state::{HistoryEntry, Partition, TransitionResult};
use cuebook_domain::{
    Billing, Booking, BookingStatus, DomainError, HalfHour, TableStatus, TimeRange,
    billable_duration, compute_amount, pick_free_table, validate_booking_window,
    validate_cancellation,
};
use time::OffsetDateTime;

/// Applies a creating command to a partition, producing a new booking.
///
/// `CreateBooking` admits a `pending` reservation; `OpenNow` admits a walk-in
/// that is `checked-in` from the start. Both re-check capacity against the
/// partition, which the caller must have loaded inside its write
/// transaction.
///
/// # Arguments
///
/// * `partition` - The `(club, type, date)` the booking falls in
/// * `command` - `CreateBooking` or `OpenNow`
/// * `actor` - The actor performing this action
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The range is off-grid, outside operating hours, or already over
/// - No table of the type is free for the range
/// - No rate is configured for the type
/// - A requested physical table is unknown or in use
#[allow(clippy::too_many_lines)]
pub fn apply_create(
    partition: &Partition,
    command: Command,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let club_id: i64 = partition.club.id();

    match command {
        Command::CreateBooking {
            table_type,
            date,
            range,
            user_id,
            note,
            idempotency_key,
        } => {
            if table_type != partition.table_type || date != partition.date {
                return Err(CoreError::Internal(format!(
                    "partition {}/{} does not match booking {table_type}/{date}",
                    partition.table_type, partition.date
                )));
            }

            validate_booking_window(&partition.club, date, &range, now)?;

            let rate_per_hour: i64 = partition
                .rate_per_hour
                .ok_or(CoreError::RateNotFound {
                    club_id,
                    table_type,
                })?;

            if !partition.availability(&range).has_capacity() {
                return Err(CoreError::DomainViolation(DomainError::NoTableAvailable {
                    table_type: table_type.to_string(),
                }));
            }

            let booking: Booking = Booking {
                booking_id: 0,
                club_id,
                table_type,
                assigned_table: None,
                user_id,
                booking_date: date,
                start: range.start(),
                end: Some(range.end()),
                is_walk_in: false,
                status: BookingStatus::Pending,
                rate_per_hour,
                total_amount: None,
                check_in_at: None,
                check_out_at: None,
                cancelled_at: None,
                note,
                idempotency_key,
                created_by: actor.id.clone(),
                created_at: now,
            };

            Ok(TransitionResult {
                booking,
                history: HistoryEntry {
                    action: String::from("CreateBooking"),
                    from: None,
                    to: BookingStatus::Pending,
                    actor,
                    at: now,
                    details: Some(format!("Booked {table_type} {range} on {date}")),
                },
                availability_changed: true,
                table_hint: None,
            })
        }
        Command::OpenNow {
            table_type,
            table_number,
            user_id,
            end,
            idempotency_key,
        } => {
            let club = &partition.club;
            let local = club.local_moment(now)?;
            if table_type != partition.table_type || local.date != partition.date {
                return Err(CoreError::Internal(format!(
                    "partition {}/{} does not match walk-in {table_type}/{}",
                    partition.table_type, partition.date, local.date
                )));
            }

            let start: HalfHour = local.tick();
            let planned_end: HalfHour = end.unwrap_or_else(|| club.close());
            if start < club.open() || start >= club.close() {
                return Err(CoreError::DomainViolation(
                    DomainError::OutsideOperatingHours {
                        start: start.to_string(),
                        end: planned_end.to_string(),
                        open: club.open().to_string(),
                        close: club.close().to_string(),
                    },
                ));
            }
            let range: TimeRange = TimeRange::new(start, planned_end)?;
            club.validate_range(&range)?;

            let rate_per_hour: i64 = partition
                .rate_per_hour
                .ok_or(CoreError::RateNotFound {
                    club_id,
                    table_type,
                })?;

            if !partition.availability(&range).has_capacity() {
                return Err(CoreError::DomainViolation(DomainError::NoTableAvailable {
                    table_type: table_type.to_string(),
                }));
            }

            let table: i32 = match table_number {
                Some(number) => {
                    if !partition.tables.iter().any(|t| t.table_number == number) {
                        return Err(CoreError::DomainViolation(DomainError::TableNotFound {
                            club_id,
                            table_number: number,
                        }));
                    }
                    if partition.checked_in_tables.contains(&number) {
                        return Err(CoreError::DomainViolation(DomainError::TableOccupied {
                            table_number: number,
                        }));
                    }
                    number
                }
                None => free_table(partition)?,
            };

            let booking: Booking = Booking {
                booking_id: 0,
                club_id,
                table_type,
                assigned_table: Some(table),
                user_id,
                booking_date: local.date,
                start,
                end,
                is_walk_in: true,
                status: BookingStatus::CheckedIn,
                rate_per_hour,
                total_amount: None,
                check_in_at: Some(now),
                check_out_at: None,
                cancelled_at: None,
                note: None,
                idempotency_key,
                created_by: actor.id.clone(),
                created_at: now,
            };

            Ok(TransitionResult {
                booking,
                history: HistoryEntry {
                    action: String::from("OpenNow"),
                    from: None,
                    to: BookingStatus::CheckedIn,
                    actor,
                    at: now,
                    details: Some(format!("Walk-in at {table_type} table {table} from {start}")),
                },
                availability_changed: true,
                table_hint: Some((table, TableStatus::Occupied)),
            })
        }
        other => Err(CoreError::Internal(format!(
            "apply_create called with {}",
            other.name()
        ))),
    }
}

/// Applies a command to an existing booking, producing its next version.
///
/// The caller persists the result with a compare-and-swap on the booking's
/// current status so two racing transitions cannot both win.
///
/// # Arguments
///
/// * `partition` - The booking's `(club, type, date)`
/// * `booking` - The booking as currently stored
/// * `command` - The transition to perform
/// * `actor` - The actor performing this action
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The lifecycle does not allow the transition
/// - Cancellation is inside the cutoff
/// - Check-in is not on the booking date, or would take a table another
///   reservation holds
/// - The billed duration is not positive
/// - A pending booking is expired before its start, or a confirmed one is
///   released before its end
#[allow(clippy::too_many_lines)]
pub fn apply(
    partition: &Partition,
    booking: &Booking,
    command: Command,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if partition.club.id() != booking.club_id {
        return Err(CoreError::Internal(format!(
            "partition of club {} loaded for booking {} of club {}",
            partition.club.id(),
            booking.booking_id,
            booking.club_id
        )));
    }

    let from: BookingStatus = booking.status;
    let action: &'static str = command.name();
    let mut next: Booking = booking.clone();
    let mut availability_changed: bool = false;
    let mut table_hint: Option<(i32, TableStatus)> = None;
    let details: Option<String>;

    match command {
        Command::Confirm => {
            from.validate_transition(BookingStatus::Confirmed)?;
            next.status = BookingStatus::Confirmed;
            details = None;
        }
        Command::CheckIn => {
            from.validate_transition(BookingStatus::CheckedIn)?;
            let table: i32 = seat(partition, booking, now)?;
            next.status = BookingStatus::CheckedIn;
            next.assigned_table = Some(table);
            next.check_in_at = Some(now);
            table_hint = Some((table, TableStatus::Occupied));
            details = Some(format!("Seated at table {table}"));
        }
        Command::Cancel => {
            if !matches!(from, BookingStatus::Pending | BookingStatus::Confirmed) {
                return Err(CoreError::DomainViolation(DomainError::InvalidTransition {
                    from,
                    to: BookingStatus::Cancelled,
                }));
            }
            let starts_at: OffsetDateTime =
                partition.club.instant_at(booking.booking_date, booking.start)?;
            validate_cancellation(starts_at, now)?;
            next.status = BookingStatus::Cancelled;
            next.cancelled_at = Some(now);
            availability_changed = true;
            details = None;
        }
        Command::EndPlay => {
            from.validate_transition(BookingStatus::Completed)?;
            let billing: Billing = bill(booking, now)?;
            next.status = BookingStatus::Completed;
            next.check_out_at = Some(now);
            next.total_amount = Some(billing.amount);
            availability_changed = true;
            table_hint = booking
                .assigned_table
                .map(|table| (table, TableStatus::Available));
            details = Some(format!(
                "Billed {} half-hour units at {}/h: {}",
                billing.billed_units, billing.rate_per_hour, billing.amount
            ));
        }
        Command::ExpirePending => {
            if from != BookingStatus::Pending {
                return Err(CoreError::DomainViolation(DomainError::InvalidTransition {
                    from,
                    to: BookingStatus::Cancelled,
                }));
            }
            let starts_at: OffsetDateTime =
                partition.club.instant_at(booking.booking_date, booking.start)?;
            if now < starts_at {
                return Err(CoreError::NotExpired {
                    booking_id: booking.booking_id,
                });
            }
            next.status = BookingStatus::Cancelled;
            next.cancelled_at = Some(now);
            availability_changed = true;
            details = Some(String::from("Payment not confirmed before start"));
        }
        Command::ReleaseNoShow => {
            if from != BookingStatus::Confirmed {
                return Err(CoreError::DomainViolation(DomainError::InvalidTransition {
                    from,
                    to: BookingStatus::Cancelled,
                }));
            }
            let close: HalfHour = partition.club.close();
            let ends_at: OffsetDateTime = partition
                .club
                .instant_at(booking.booking_date, booking.occupied_range(close).end())?;
            if now < ends_at {
                return Err(CoreError::NotExpired {
                    booking_id: booking.booking_id,
                });
            }
            next.status = BookingStatus::Cancelled;
            next.cancelled_at = Some(now);
            availability_changed = true;
            details = Some(String::from("Not checked in before end"));
        }
        Command::CreateBooking { .. } | Command::OpenNow { .. } => {
            return Err(CoreError::Internal(format!("apply called with {action}")));
        }
    }

    Ok(TransitionResult {
        history: HistoryEntry {
            action: String::from(action),
            from: Some(from),
            to: next.status,
            actor,
            at: now,
            details,
        },
        booking: next,
        availability_changed,
        table_hint,
    })
}

/// Computes what ending a session now would bill, without changing it.
///
/// # Errors
///
/// Returns an error if the booking is not checked in or the elapsed
/// duration is not positive.
pub fn preview_end_play(booking: &Booking, now: OffsetDateTime) -> Result<Billing, CoreError> {
    if booking.status != BookingStatus::CheckedIn {
        return Err(CoreError::DomainViolation(DomainError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::Completed,
        }));
    }
    bill(booking, now)
}

fn bill(booking: &Booking, now: OffsetDateTime) -> Result<Billing, CoreError> {
    let check_in_at: OffsetDateTime = booking.check_in_at.ok_or_else(|| {
        CoreError::Internal(format!(
            "checked-in booking {} has no check-in instant",
            booking.booking_id
        ))
    })?;
    let duration = billable_duration(booking.scheduled_minutes(), check_in_at, now);
    Ok(compute_amount(booking.rate_per_hour, duration)?)
}

fn free_table(partition: &Partition) -> Result<i32, CoreError> {
    pick_free_table(&partition.tables, &partition.checked_in_tables).ok_or_else(|| {
        CoreError::DomainViolation(DomainError::NoTableAvailable {
            table_type: partition.table_type.to_string(),
        })
    })
}

/// Picks the table a reservation is seated at.
///
/// The session keeps its table from now until its scheduled end, so every
/// half hour in that span must leave a free table for each other unseated
/// reservation covering it.
fn seat(partition: &Partition, booking: &Booking, now: OffsetDateTime) -> Result<i32, CoreError> {
    let club = &partition.club;
    let local = club.local_moment(now)?;
    if local.date != booking.booking_date {
        return Err(CoreError::DomainViolation(
            DomainError::CheckInOutsideBookingDate {
                booking_date: booking.booking_date,
                today: local.date,
            },
        ));
    }

    let close: HalfHour = club.close();
    let first: u8 = local.tick().index();
    let last: u8 = booking.occupied_range(close).end().index().max(first + 1);
    let mut held: usize = 0;
    for index in first..last {
        let tick: HalfHour = HalfHour::from_index(index)?;
        let covering: usize = partition
            .bookings
            .iter()
            .filter(|other| {
                other.booking_id != booking.booking_id
                    && matches!(other.status, BookingStatus::Pending | BookingStatus::Confirmed)
                    && other.occupied_range(close).covers(tick)
            })
            .count();
        held = held.max(covering);
    }

    let free: usize = partition
        .tables
        .iter()
        .filter(|table| !partition.checked_in_tables.contains(&table.table_number))
        .count();
    if free <= held {
        return Err(CoreError::DomainViolation(DomainError::NoTableAvailable {
            table_type: partition.table_type.to_string(),
        }));
    }
    free_table(partition)
}
