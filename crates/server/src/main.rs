// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod identity;
mod live;
mod sweeper;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use cuebook::{Clock, Publisher, SystemClock};
use cuebook_api::{
    ApiError, AvailabilityResponse, BookTableRequest, BookingDetailResponse, BookingWriteResponse,
    CheckAvailabilityRequest, DashboardStatsResponse, OpenTableRequest, PreviewResponse,
    RETRY_BACKOFF_MS, RevenueRequest, RevenueResponse, book_table, cancel_booking,
    check_available_tables, check_in, check_out, confirm_booking, dashboard_stats, get_booking,
    open_table, preview_booking, revenue_by_time,
};
use cuebook_persistence::{Persistence, RegistrySeed};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::identity::RequestActor;
use crate::live::{ClubHub, live_events_handler};

/// Cuebook server - table booking and availability for billiards clubs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "CUEBOOK_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, env = "CUEBOOK_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "CUEBOOK_PORT", default_value_t = 3000)]
    port: u16,

    /// JSON file with clubs, tables, and rates to load at startup
    #[arg(short, long, env = "CUEBOOK_SEED")]
    seed: Option<String>,

    /// Seconds between pending-expiry sweeps; 0 disables the sweeper
    #[arg(long, env = "CUEBOOK_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    sweep_interval_secs: u64,
}

/// Application state shared across handlers.
///
/// The store sits behind one async mutex; the hub and the clock are
/// lock-free.
#[derive(Clone)]
struct AppState {
    /// The booking store.
    persistence: Arc<Mutex<Persistence>>,
    /// Realtime fan-out for committed writes.
    hub: Arc<ClubHub>,
    /// Source of `now` for every request.
    clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for Arc<ClubHub> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.hub)
    }
}

/// Query string of the dashboard endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct DashboardQuery {
    /// The club.
    #[serde(rename = "clubId", alias = "club_id")]
    club_id: i64,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } | ApiError::TransientConflict { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Runs a handler against the store, retrying transient conflicts.
///
/// The store lock is released between attempts.
async fn with_retry<T, F>(app_state: &AppState, action: &str, mut op: F) -> Result<T, HttpError>
where
    F: FnMut(&mut Persistence, &dyn Publisher, OffsetDateTime) -> Result<T, ApiError>,
{
    for backoff_ms in RETRY_BACKOFF_MS {
        let result: Result<T, ApiError> = {
            let mut persistence = app_state.persistence.lock().await;
            op(&mut persistence, app_state.hub.as_ref(), app_state.clock.now())
        };
        match result {
            Err(err) if err.is_transient() => {
                warn!(action, backoff_ms, error = %err, "Transient conflict, retrying");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            other => return other.map_err(HttpError::from),
        }
    }

    let mut persistence = app_state.persistence.lock().await;
    op(&mut persistence, app_state.hub.as_ref(), app_state.clock.now()).map_err(|err| {
        if err.is_transient() {
            warn!(action, error = %err, "Transient conflict, retries exhausted");
        }
        HttpError::from(err)
    })
}

/// Handler for POST `/booking/book-table`.
///
/// Returns 201 for a new booking and 200 when an idempotency key replays.
async fn handle_book_table(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Json(req): Json<BookTableRequest>,
) -> Result<(StatusCode, Json<BookingWriteResponse>), HttpError> {
    let response: BookingWriteResponse =
        with_retry(&app_state, "book_table", |persistence, publisher, now| {
            book_table(persistence, publisher, &actor, req.clone(), now)
        })
        .await?;
    let status: StatusCode = if response.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

/// Handler for POST `/booking/open-table`.
async fn handle_open_table(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Json(req): Json<OpenTableRequest>,
) -> Result<(StatusCode, Json<BookingWriteResponse>), HttpError> {
    let response: BookingWriteResponse =
        with_retry(&app_state, "open_table", |persistence, publisher, now| {
            open_table(persistence, publisher, &actor, req.clone(), now)
        })
        .await?;
    let status: StatusCode = if response.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

/// Handler for GET `/booking/check-available-tables/{club_id}`.
async fn handle_check_available_tables(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(club_id): Path<i64>,
    Query(query): Query<CheckAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, HttpError> {
    let response: AvailabilityResponse = with_retry(
        &app_state,
        "check_available_tables",
        |persistence, _publisher, _now| {
            check_available_tables(persistence, &actor, club_id, &query)
        },
    )
    .await?;
    Ok(Json(response))
}

/// Handler for PUT `/booking/confirm/{booking_id}`.
async fn handle_confirm(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    let response: BookingWriteResponse =
        with_retry(&app_state, "confirm_booking", |persistence, publisher, now| {
            confirm_booking(persistence, publisher, &actor, booking_id, now)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for PUT `/booking/check-in/{booking_id}`.
async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    let response: BookingWriteResponse =
        with_retry(&app_state, "check_in", |persistence, publisher, now| {
            check_in(persistence, publisher, &actor, booking_id, now)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for PUT `/booking/check-out/{booking_id}`.
async fn handle_check_out(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    let response: BookingWriteResponse =
        with_retry(&app_state, "check_out", |persistence, publisher, now| {
            check_out(persistence, publisher, &actor, booking_id, now)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for PUT `/booking/cancel-booking/{booking_id}`.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    let response: BookingWriteResponse =
        with_retry(&app_state, "cancel_booking", |persistence, publisher, now| {
            cancel_booking(persistence, publisher, &actor, booking_id, now)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for GET `/booking/preview-bookings/{booking_id}`.
async fn handle_preview_booking(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<PreviewResponse>, HttpError> {
    let response: PreviewResponse =
        with_retry(&app_state, "preview_booking", |persistence, _publisher, now| {
            preview_booking(persistence, &actor, booking_id, now)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for GET `/booking/{booking_id}`.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetailResponse>, HttpError> {
    let response: BookingDetailResponse =
        with_retry(&app_state, "get_booking", |persistence, _publisher, _now| {
            get_booking(persistence, &actor, booking_id)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for GET `/booking/dashboard-stats`.
async fn handle_dashboard_stats(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardStatsResponse>, HttpError> {
    let response: DashboardStatsResponse =
        with_retry(&app_state, "dashboard_stats", |persistence, _publisher, now| {
            dashboard_stats(persistence, &actor, query.club_id, now)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for GET `/booking/revenue-by-time`.
async fn handle_revenue_by_time(
    AxumState(app_state): AxumState<AppState>,
    RequestActor(actor): RequestActor,
    Query(query): Query<RevenueRequest>,
) -> Result<Json<RevenueResponse>, HttpError> {
    let response: RevenueResponse =
        with_retry(&app_state, "revenue_by_time", |persistence, _publisher, _now| {
            revenue_by_time(persistence, &actor, &query)
        })
        .await?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/booking/book-table", post(handle_book_table))
        .route("/booking/open-table", post(handle_open_table))
        .route(
            "/booking/check-available-tables/{club_id}",
            get(handle_check_available_tables),
        )
        .route("/booking/confirm/{booking_id}", put(handle_confirm))
        .route("/booking/check-in/{booking_id}", put(handle_check_in))
        .route("/booking/check-out/{booking_id}", put(handle_check_out))
        .route(
            "/booking/cancel-booking/{booking_id}",
            put(handle_cancel_booking),
        )
        .route(
            "/booking/preview-bookings/{booking_id}",
            get(handle_preview_booking),
        )
        .route("/booking/dashboard-stats", get(handle_dashboard_stats))
        .route("/booking/revenue-by-time", get(handle_revenue_by_time))
        .route("/booking/{booking_id}", get(handle_get_booking))
        .route("/ws", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing cuebook server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let Some(seed_path) = &args.seed {
        let seed: RegistrySeed = RegistrySeed::from_path(seed_path)?;
        persistence.seed_registry(&seed)?;
        info!(
            clubs = seed.clubs.len(),
            tables = seed.tables.len(),
            rates = seed.rates.len(),
            "Loaded registry seed from {}",
            seed_path
        );
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        hub: Arc::new(ClubHub::new()),
        clock: Arc::new(SystemClock),
    };

    if args.sweep_interval_secs == 0 {
        info!("Pending expiry sweeper disabled");
    } else {
        sweeper::spawn_expiry_sweeper(
            app_state.clone(),
            Duration::from_secs(args.sweep_interval_secs),
        );
    }

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(error = %e, %addr, "Failed to bind");
        e
    })?;
    axum::serve(listener, app).await?;

    Ok(())
}
