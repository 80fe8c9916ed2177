// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for booking writes, availability, and reporting.
//!
//! Every handler validates its input before touching the store, runs one
//! store operation, and publishes the resulting events only after that
//! operation committed. Handlers make a single attempt; retrying transient
//! conflicts is the caller's job (see [`RETRY_BACKOFF_MS`]).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::str::FromStr;

use cuebook::{
    Actor, Command, Publisher, TransitionResult, is_expired_pending, is_no_show, publish_all,
};
use cuebook_domain::{
    Availability, Billing, Booking, BookingStatus, Club, DashboardStats, DomainError, HalfHour,
    RevenueBucket, RevenuePeriod, TableType, TimeRange, dashboard_stats as compute_dashboard_stats,
    parse_iso_date, revenue_by_time as compute_revenue_by_time,
};
use cuebook_persistence::{CreateOutcome, HistoryRecord, Persistence, TransactionError};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_domain_error, translate_persistence_error, translate_transaction_error,
};
use crate::request_response::{
    AvailabilityResponse, BookTableRequest, BookingDetailResponse, BookingResponse,
    BookingWriteResponse, CheckAvailabilityRequest, DashboardStatsResponse, ExpirySummary,
    OpenTableRequest, PreviewResponse, RevenueRequest, RevenueResponse,
};

/// Backoff before each retry of a transient conflict, in milliseconds.
///
/// A request is attempted once plus once per entry.
pub const RETRY_BACKOFF_MS: [u64; 3] = [25, 50, 100];

/// Logs a rejected request and passes the error through.
fn rejected(action: &str, actor: &AuthenticatedActor, err: ApiError) -> ApiError {
    warn!(action, actor_id = %actor.id, error = %err, "Request rejected");
    err
}

fn parse_table_type(value: &str) -> Result<TableType, ApiError> {
    TableType::from_str(value).map_err(translate_domain_error)
}

fn parse_date(value: &str) -> Result<Date, ApiError> {
    parse_iso_date(value).map_err(translate_domain_error)
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<Date>, ApiError> {
    value.map(parse_date).transpose()
}

fn load_club(persistence: &mut Persistence, club_id: i64) -> Result<Club, ApiError> {
    persistence
        .get_club(club_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Club"),
            message: format!("Club {club_id} does not exist"),
        })
}

fn load_booking(persistence: &mut Persistence, booking_id: i64) -> Result<Booking, ApiError> {
    persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        })
}

fn write_response(booking: &Booking, replayed: bool, message: String) -> BookingWriteResponse {
    BookingWriteResponse {
        booking: BookingResponse::from(booking),
        replayed,
        message,
    }
}

fn finish_create(
    publisher: &dyn Publisher,
    outcome: &CreateOutcome,
    verb: &str,
) -> BookingWriteResponse {
    let booking: &Booking = outcome.booking();
    publish_all(publisher, &outcome.events());

    if outcome.is_replay() {
        return write_response(
            booking,
            true,
            format!("Booking {} already exists for this key", booking.booking_id),
        );
    }

    info!(
        booking_id = booking.booking_id,
        club_id = booking.club_id,
        table_type = booking.table_type.as_str(),
        status = booking.status.as_str(),
        "{verb}"
    );
    write_response(
        booking,
        false,
        format!("{verb}: booking {}", booking.booking_id),
    )
}

/// Runs one lifecycle command against a stored booking and publishes the
/// resulting events.
fn run_transition(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
    command: Command,
    now: OffsetDateTime,
) -> Result<TransitionResult, ApiError> {
    let action: &'static str = command.name();
    let result: TransitionResult = persistence
        .transition_booking(booking_id, command, authenticated_actor.to_actor(), now)
        .map_err(|e| rejected(action, authenticated_actor, translate_transaction_error(e)))?;

    publish_all(publisher, &result.events());
    info!(
        booking_id,
        club_id = result.booking.club_id,
        action,
        to = result.booking.status.as_str(),
        actor_id = %authenticated_actor.id,
        "Booking transition applied"
    );
    Ok(result)
}

// ============================================================================
// Booking writes
// ============================================================================

/// Reserves a table type for a future range.
///
/// The booking starts out `pending`. Customers book for themselves; staff
/// may book on behalf of any user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the club or rate is unknown,
/// no table of the type is free over the range, or the store is busy.
pub fn book_table(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    request: BookTableRequest,
    now: OffsetDateTime,
) -> Result<BookingWriteResponse, ApiError> {
    AuthorizationService::authorize_book_for(authenticated_actor, request.user_id.as_deref())
        .map_err(|e| rejected("book_table", authenticated_actor, e.into()))?;

    let table_type: TableType = parse_table_type(&request.table_type)?;
    let date: Date = parse_date(&request.booking_date)?;
    let range: TimeRange = TimeRange::from_hours(request.start_hour, request.end_hour)
        .map_err(translate_domain_error)?;
    let user_id: Option<String> = request
        .user_id
        .or_else(|| (!authenticated_actor.is_staff()).then(|| authenticated_actor.id.clone()));

    let command: Command = Command::CreateBooking {
        table_type,
        date,
        range,
        user_id,
        note: request.note,
        idempotency_key: request.idempotency_key,
    };

    let outcome: CreateOutcome = persistence
        .create_booking(
            request.club_id,
            command,
            authenticated_actor.to_actor(),
            now,
        )
        .map_err(|e| {
            rejected(
                "book_table",
                authenticated_actor,
                translate_transaction_error(e),
            )
        })?;

    Ok(finish_create(publisher, &outcome, "Booking created"))
}

/// Opens a walk-in session at the current half hour.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the input is invalid, the
/// requested table is occupied, or no table of the type is free.
pub fn open_table(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    request: OpenTableRequest,
    now: OffsetDateTime,
) -> Result<BookingWriteResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "open_table")
        .map_err(|e| rejected("open_table", authenticated_actor, e.into()))?;

    let table_type: TableType = parse_table_type(&request.table_type)?;
    let end: Option<HalfHour> = request
        .end_hour
        .map(HalfHour::from_hours)
        .transpose()
        .map_err(translate_domain_error)?;

    let command: Command = Command::OpenNow {
        table_type,
        table_number: request.table_number,
        user_id: request.user_id,
        end,
        idempotency_key: request.idempotency_key,
    };

    let outcome: CreateOutcome = persistence
        .create_booking(
            request.club_id,
            command,
            authenticated_actor.to_actor(),
            now,
        )
        .map_err(|e| {
            rejected(
                "open_table",
                authenticated_actor,
                translate_transaction_error(e),
            )
        })?;

    Ok(finish_create(publisher, &outcome, "Walk-in opened"))
}

/// Records that payment for a pending booking was received.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the booking is unknown, or
/// the booking is not `pending`.
pub fn confirm_booking(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
    now: OffsetDateTime,
) -> Result<BookingWriteResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "confirm_booking")
        .map_err(|e| rejected("confirm_booking", authenticated_actor, e.into()))?;

    let result: TransitionResult = run_transition(
        persistence,
        publisher,
        authenticated_actor,
        booking_id,
        Command::Confirm,
        now,
    )?;
    Ok(write_response(
        &result.booking,
        false,
        format!("Booking {booking_id} confirmed"),
    ))
}

/// Seats the customer of a booking at a physical table.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the booking cannot be
/// checked in from its status, or every table of the type is seated.
pub fn check_in(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
    now: OffsetDateTime,
) -> Result<BookingWriteResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "check_in")
        .map_err(|e| rejected("check_in", authenticated_actor, e.into()))?;

    let result: TransitionResult = run_transition(
        persistence,
        publisher,
        authenticated_actor,
        booking_id,
        Command::CheckIn,
        now,
    )?;
    let message: String = match result.booking.assigned_table {
        Some(table_number) => format!("Booking {booking_id} seated at table {table_number}"),
        None => format!("Booking {booking_id} checked in"),
    };
    Ok(write_response(&result.booking, false, message))
}

/// Ends a session and records its bill.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the booking is not checked
/// in, or the billable duration is not positive.
pub fn check_out(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
    now: OffsetDateTime,
) -> Result<BookingWriteResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "check_out")
        .map_err(|e| rejected("check_out", authenticated_actor, e.into()))?;

    let result: TransitionResult = run_transition(
        persistence,
        publisher,
        authenticated_actor,
        booking_id,
        Command::EndPlay,
        now,
    )?;
    let amount: i64 = result.booking.total_amount.unwrap_or(0);
    Ok(write_response(
        &result.booking,
        false,
        format!("Booking {booking_id} completed, billed {amount}"),
    ))
}

/// Cancels a booking before the cutoff.
///
/// # Errors
///
/// Returns an error if the actor neither owns the booking nor is staff,
/// the booking is past the cancellation cutoff, or it is not cancellable
/// from its status.
pub fn cancel_booking(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
    now: OffsetDateTime,
) -> Result<BookingWriteResponse, ApiError> {
    // Owner is immutable; checked before the write.
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_cancel(authenticated_actor, &booking)
        .map_err(|e| rejected("cancel_booking", authenticated_actor, e.into()))?;

    let result: TransitionResult = run_transition(
        persistence,
        publisher,
        authenticated_actor,
        booking_id,
        Command::Cancel,
        now,
    )?;
    Ok(write_response(
        &result.booking,
        false,
        format!("Booking {booking_id} cancelled"),
    ))
}

// ============================================================================
// Reads
// ============================================================================

/// Counts free tables of a type over a range.
///
/// # Errors
///
/// Returns an error if the input is invalid, the club is unknown, or the
/// range lies outside operating hours.
pub fn check_available_tables(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    club_id: i64,
    request: &CheckAvailabilityRequest,
) -> Result<AvailabilityResponse, ApiError> {
    let table_type: TableType = parse_table_type(&request.table_type)?;
    let date: Date = parse_date(&request.date)?;
    let range: TimeRange =
        TimeRange::from_hours(request.start, request.end).map_err(translate_domain_error)?;

    let availability: Availability = persistence
        .check_availability(club_id, table_type, date, &range)
        .map_err(|e| {
            rejected(
                "check_available_tables",
                authenticated_actor,
                translate_transaction_error(e),
            )
        })?;

    debug!(
        club_id,
        table_type = table_type.as_str(),
        %date,
        range = %range,
        available = availability.available,
        total = availability.total,
        "Availability checked"
    );

    Ok(AvailabilityResponse {
        club_id,
        table_type,
        booking_date: date,
        start_hour: range.start(),
        end_hour: range.end(),
        available: availability.available,
        total: availability.total,
    })
}

/// Reads a booking and its history.
///
/// # Errors
///
/// Returns an error if the booking is unknown or belongs to somebody else.
pub fn get_booking(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<BookingDetailResponse, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_view(authenticated_actor, &booking)
        .map_err(|e| rejected("get_booking", authenticated_actor, e.into()))?;

    let history: Vec<HistoryRecord> = persistence
        .get_booking_history(booking_id)
        .map_err(translate_persistence_error)?;

    Ok(BookingDetailResponse {
        booking: BookingResponse::from(&booking),
        history,
    })
}

/// Computes what ending a session now would bill, without writing.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the booking is not
/// checked in.
pub fn preview_booking(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    booking_id: i64,
    now: OffsetDateTime,
) -> Result<PreviewResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "preview_booking")
        .map_err(|e| rejected("preview_booking", authenticated_actor, e.into()))?;

    let booking: Booking = load_booking(persistence, booking_id)?;
    let billing: Billing = persistence
        .preview_end_play(booking_id, now)
        .map_err(|e| {
            rejected(
                "preview_booking",
                authenticated_actor,
                translate_transaction_error(e),
            )
        })?;

    Ok(PreviewResponse {
        booking_id,
        check_in_at: booking.check_in_at,
        as_of: now,
        billed_units: billing.billed_units,
        billed_hours: billing.billed_hours(),
        rate_per_hour: billing.rate_per_hour,
        amount: billing.amount,
    })
}

/// Returns today's numbers for a club dashboard.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the club is unknown.
pub fn dashboard_stats(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    club_id: i64,
    now: OffsetDateTime,
) -> Result<DashboardStatsResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "dashboard_stats")
        .map_err(|e| rejected("dashboard_stats", authenticated_actor, e.into()))?;

    let club: Club = load_club(persistence, club_id)?;
    let bookings: Vec<Booking> = persistence
        .list_club_bookings(club_id)
        .map_err(translate_persistence_error)?;
    let stats: DashboardStats =
        compute_dashboard_stats(&club, &bookings, now).map_err(translate_domain_error)?;

    Ok(DashboardStatsResponse { club_id, stats })
}

/// Buckets completed revenue by day, ISO week, or month.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the period or a date is
/// invalid, or the club is unknown.
pub fn revenue_by_time(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &RevenueRequest,
) -> Result<RevenueResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "revenue_by_time")
        .map_err(|e| rejected("revenue_by_time", authenticated_actor, e.into()))?;

    let period: RevenuePeriod =
        RevenuePeriod::from_str(&request.period).map_err(translate_domain_error)?;
    let from: Option<Date> = parse_optional_date(request.from.as_deref())?;
    let to: Option<Date> = parse_optional_date(request.to.as_deref())?;

    let club: Club = load_club(persistence, request.club_id)?;
    let bookings: Vec<Booking> = persistence
        .list_club_bookings(request.club_id)
        .map_err(translate_persistence_error)?;
    let buckets: Vec<RevenueBucket> =
        compute_revenue_by_time(&club, &bookings, period, from, to)
            .map_err(translate_domain_error)?;

    let total_revenue: i64 = buckets
        .iter()
        .try_fold(0_i64, |total, bucket| total.checked_add(bucket.revenue))
        .ok_or_else(|| translate_domain_error(DomainError::AmountOverflow))?;

    Ok(RevenueResponse {
        club_id: request.club_id,
        period,
        buckets,
        total_revenue,
    })
}

// ============================================================================
// Pending expiry
// ============================================================================

/// Cancels every pending booking whose start instant has passed and
/// releases every confirmed booking that reached its end unseated.
///
/// Candidates are unseated bookings dated up to one day past the UTC date
/// of `now`, which covers every club timezone. Each candidate is re-checked
/// inside its own write; a candidate that another writer moved first, or
/// whose club clock cannot resolve its times, is skipped.
///
/// # Errors
///
/// Returns an error only if the store fails in a way that is not a race.
pub fn expire_pending_bookings(
    persistence: &mut Persistence,
    publisher: &dyn Publisher,
    now: OffsetDateTime,
) -> Result<ExpirySummary, ApiError> {
    let horizon: Date = now.date().next_day().unwrap_or_else(|| now.date());
    let candidates: Vec<Booking> = persistence
        .list_unseated_bookings_until(horizon)
        .map_err(translate_persistence_error)?;

    let mut summary: ExpirySummary = ExpirySummary {
        inspected: candidates.len(),
        ..ExpirySummary::default()
    };
    let mut clubs: HashMap<i64, Club> = HashMap::new();

    for booking in candidates {
        let club: &Club = match clubs.entry(booking.club_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(load_club(persistence, booking.club_id)?)
            }
        };
        let due: Result<Option<Command>, DomainError> = match booking.status {
            BookingStatus::Pending => is_expired_pending(club, &booking, now)
                .map(|expired| expired.then_some(Command::ExpirePending)),
            BookingStatus::Confirmed => is_no_show(club, &booking, now)
                .map(|no_show| no_show.then_some(Command::ReleaseNoShow)),
            _ => Ok(None),
        };
        let command: Command = match due {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                summary.skipped += 1;
                warn!(
                    booking_id = booking.booking_id,
                    reason = %err,
                    "Expiry skipped; booking times do not resolve"
                );
                continue;
            }
        };
        let releasing: bool = matches!(command, Command::ReleaseNoShow);

        match persistence.transition_booking(booking.booking_id, command, Actor::system(), now) {
            Ok(result) => {
                publish_all(publisher, &result.events());
                if releasing {
                    summary.released += 1;
                    info!(
                        booking_id = booking.booking_id,
                        club_id = booking.club_id,
                        "Unseated confirmed booking released"
                    );
                } else {
                    summary.expired += 1;
                    info!(
                        booking_id = booking.booking_id,
                        club_id = booking.club_id,
                        "Pending booking expired"
                    );
                }
            }
            Err(err) if err.is_transient() || matches!(err, TransactionError::Aborted(_)) => {
                summary.skipped += 1;
                debug!(
                    booking_id = booking.booking_id,
                    reason = %err,
                    "Expiry skipped"
                );
            }
            Err(err) => return Err(translate_transaction_error(err)),
        }
    }

    if summary.expired > 0 || summary.released > 0 {
        info!(
            expired = summary.expired,
            released = summary.released,
            skipped = summary.skipped,
            "Expiry sweep finished"
        );
    }
    Ok(summary)
}
