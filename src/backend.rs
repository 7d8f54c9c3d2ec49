//! Development backend: the booking HTTP contract served from memory.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::controller::{FlightController, ReserveError};
use crate::wire::{BookingRecord, CreateBookingBody, ErrorBody, ScheduleRecord, USER_EMAIL_HEADER};

#[derive(Clone)]
pub struct BackendState {
    controller: Arc<Mutex<FlightController>>,
    latency: Duration,
    failure_rate: f32,
}

impl BackendState {
    pub fn new(controller: FlightController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            latency: Duration::ZERO,
            failure_rate: 0.0,
        }
    }

    pub fn with_faults(mut self, config: &ServerConfig) -> Self {
        self.latency = Duration::from_millis(config.latency_ms);
        self.failure_rate = config.failure_rate;
        self
    }

    /// Locks the store, expiring overdue bookings first.
    fn store(&self) -> Result<MutexGuard<'_, FlightController>, BackendError> {
        let mut guard = self
            .controller
            .lock()
            .map_err(|_| BackendError::Internal("store lock poisoned".to_string()))?;
        guard.expire_overdue(Utc::now());
        Ok(guard)
    }
}

#[derive(Debug)]
pub enum BackendError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable,
    Internal(String),
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            BackendError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            BackendError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            BackendError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            BackendError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            BackendError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

impl From<ReserveError> for BackendError {
    fn from(err: ReserveError) -> Self {
        match err {
            ReserveError::FlightNotFound => BackendError::NotFound(err.to_string()),
            ReserveError::NotEnoughSeats => BackendError::Conflict(err.to_string()),
            ReserveError::InvalidSeatCount => BackendError::BadRequest(err.to_string()),
        }
    }
}

pub fn router(state: BackendState) -> Router {
    Router::new()
        .route("/schedules", get(search_schedules))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .layer(middleware::from_fn_with_state(state.clone(), simulate_network))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: BackendState) -> std::io::Result<()> {
    info!("Backend listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

/// Applies the configured latency, then drops a share of requests with 503.
async fn simulate_network(State(state): State<BackendState>, request: Request, next: Next) -> Response {
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }
    if state.failure_rate > 0.0 && rand::random::<f32>() < state.failure_rate {
        warn!(path = %request.uri().path(), "Failure injection triggered: dropping request");
        return BackendError::Unavailable.into_response();
    }
    next.run(request).await
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    origin: Option<String>,
    destination: Option<String>,
    date: Option<String>,
}

async fn search_schedules(
    State(state): State<BackendState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleRecord>>, BackendError> {
    let origin = required(query.origin, "origin")?;
    let destination = required(query.destination, "destination")?;
    let date = query
        .date
        .filter(|d| !d.trim().is_empty())
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|_| BackendError::BadRequest(format!("invalid date {d:?}, expected YYYY-MM-DD")))
        })
        .transpose()?;

    let schedules = state.store()?.query_schedules(&origin, &destination, date);
    debug!(%origin, %destination, ?date, found = schedules.len(), "schedule query");
    Ok(Json(schedules))
}

async fn list_bookings(
    State(state): State<BackendState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingRecord>>, BackendError> {
    let email = user_email(&headers)?;
    let bookings = state.store()?.bookings_for(&email);
    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> Result<Json<BookingRecord>, BackendError> {
    let booking = state.store()?.booking(&id);
    booking
        .map(Json)
        .ok_or_else(|| BackendError::NotFound("Booking not found".to_string()))
}

async fn create_booking(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<BookingRecord>), BackendError> {
    let email = user_email(&headers)?;
    if !email.eq_ignore_ascii_case(body.user_email.trim()) {
        return Err(BackendError::BadRequest(format!(
            "{USER_EMAIL_HEADER} does not match user_email"
        )));
    }

    let record = state
        .store()?
        .reserve_seats(body.flight_id, &email, body.num_seats, Utc::now())?;
    info!(booking_id = %record.booking_id, flight_id = body.flight_id, seats = body.num_seats, "booking created");
    Ok((StatusCode::CREATED, Json(record)))
}

fn required(value: Option<String>, name: &str) -> Result<String, BackendError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackendError::BadRequest(format!("{name} is required")))
}

fn user_email(headers: &HeaderMap) -> Result<String, BackendError> {
    headers
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackendError::BadRequest(format!("{USER_EMAIL_HEADER} header is required")))
}
