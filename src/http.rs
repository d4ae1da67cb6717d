use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

use crate::auth::AdminGate;
use crate::engine::{AvailabilitySnapshot, Engine, EngineError, NewBooking};
use crate::model::Booking;
use crate::observability;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub gate: Arc<AdminGate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/availability", get(get_availability))
        .route("/api/bookings", post(create_booking))
        .route("/api/admin/block", post(admin_block))
        .route("/api/admin/bookings", get(admin_bookings))
        .route("/api/admin/cancel", post(admin_cancel))
        .with_state(state)
}

// ── Errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid dates")]
    InvalidDates,
    #[error("stay is below the minimum")]
    BelowMinimumStay { min_nights: u32 },
    #[error("dates unavailable")]
    DatesUnavailable,
    #[error("conflicts with an existing booking")]
    ConflictWithBooking,
    #[error("limit exceeded")]
    LimitExceeded,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal failure")]
    Internal,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::MissingFields => ApiError::MissingFields,
            EngineError::InvalidDates => ApiError::InvalidDates,
            EngineError::BelowMinimumStay { min_nights } => {
                ApiError::BelowMinimumStay { min_nights }
            }
            EngineError::DatesUnavailable => ApiError::DatesUnavailable,
            EngineError::ConflictWithBooking => ApiError::ConflictWithBooking,
            EngineError::LimitExceeded(_) => ApiError::LimitExceeded,
            EngineError::WalError(msg) => {
                // Storage detail stays server-side; the client gets an
                // opaque retry suggestion.
                tracing::error!("storage failure: {msg}");
                ApiError::Internal
            }
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields
            | ApiError::InvalidDates
            | ApiError::BelowMinimumStay { .. }
            | ApiError::LimitExceeded => StatusCode::BAD_REQUEST,
            ApiError::DatesUnavailable | ApiError::ConflictWithBooking => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::MissingFields => "MissingFields",
            ApiError::InvalidDates => "InvalidDates",
            ApiError::BelowMinimumStay { .. } => "BelowMinimumStay",
            ApiError::DatesUnavailable => "DatesUnavailable",
            ApiError::ConflictWithBooking => "ConflictWithBooking",
            ApiError::LimitExceeded => "LimitExceeded",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::Internal => "InternalFailure",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ErrorBody {
            error: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            min_nights: Option<u32>,
        }
        let min_nights = match self {
            ApiError::BelowMinimumStay { min_nights } => Some(min_nights),
            _ => None,
        };
        (
            self.status(),
            Json(ErrorBody {
                error: self.code(),
                min_nights,
            }),
        )
            .into_response()
    }
}

fn parse_day(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ApiError::InvalidDates)
}

fn require_admin(gate: &AdminGate, headers: &HeaderMap) -> Result<(), ApiError> {
    let supplied = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok());
    if gate.authorize(supplied) {
        Ok(())
    } else {
        metrics::counter!(observability::AUTH_FAILURES_TOTAL).increment(1);
        Err(ApiError::Unauthorized)
    }
}

// ── Public endpoints ─────────────────────────────────────

#[derive(Deserialize)]
struct AvailabilityParams {
    from: Option<String>,
    to: Option<String>,
}

async fn get_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilitySnapshot>, ApiError> {
    let from = params.from.as_deref().map(parse_day).transpose()?;
    let to = params.to.as_deref().map(parse_day).transpose()?;
    Ok(Json(state.engine.availability(from, to).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingForm {
    #[serde(default)]
    check_in: Option<String>,
    #[serde(default)]
    check_out: Option<String>,
    #[serde(default)]
    guests: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingCreated {
    booking_id: Ulid,
    nights: u32,
    total_price: i64,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(form): Json<BookingForm>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(check_in), Some(check_out), Some(guests), Some(name), Some(phone)) = (
        form.check_in,
        form.check_out,
        form.guests,
        form.name,
        form.phone,
    ) else {
        return Err(ApiError::MissingFields);
    };
    // Blank date strings fail the presence check, same as absent fields;
    // only a non-blank string that won't parse is an InvalidDates.
    if check_in.trim().is_empty() || check_out.trim().is_empty() {
        return Err(ApiError::MissingFields);
    }

    let new = NewBooking {
        check_in: parse_day(&check_in)?,
        check_out: parse_day(&check_out)?,
        guests,
        name,
        phone,
        comment: form.comment,
    };

    let receipt = state.engine.create_booking(new).await.map_err(|e| {
        metrics::counter!(
            observability::BOOKINGS_REJECTED_TOTAL,
            "reason" => observability::rejection_label(&e)
        )
        .increment(1);
        ApiError::from(e)
    })?;

    metrics::counter!(observability::BOOKINGS_TOTAL).increment(1);
    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            booking_id: receipt.booking_id,
            nights: receipt.nights,
            total_price: receipt.total_price,
        }),
    ))
}

// ── Admin endpoints ──────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockForm {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Serialize)]
struct BlockCreated {
    ok: bool,
    id: Ulid,
}

async fn admin_block(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<BlockForm>,
) -> Result<Json<BlockCreated>, ApiError> {
    require_admin(&state.gate, &headers)?;

    let (Some(start), Some(end)) = (form.start_date, form.end_date) else {
        return Err(ApiError::MissingFields);
    };
    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(ApiError::MissingFields);
    }
    let id = state
        .engine
        .block_range(parse_day(&start)?, parse_day(&end)?, form.reason)
        .await?;
    metrics::counter!(observability::BLOCKS_TOTAL).increment(1);
    Ok(Json(BlockCreated { ok: true, id }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingRow {
    id: Ulid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    name: String,
    phone: String,
    guests: u32,
    comment: Option<String>,
    nights: u32,
    total_price: i64,
    created_at: DateTime<Utc>,
}

impl From<Booking> for BookingRow {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            check_in: b.range.start,
            check_out: b.range.end,
            name: b.name,
            phone: b.phone,
            guests: b.guests,
            comment: b.comment,
            nights: b.nights,
            total_price: b.total_price,
            created_at: b.created_at,
        }
    }
}

#[derive(Serialize)]
struct BookingsPage {
    rows: Vec<BookingRow>,
}

async fn admin_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BookingsPage>, ApiError> {
    require_admin(&state.gate, &headers)?;
    let rows = state
        .engine
        .list_bookings()
        .await
        .into_iter()
        .map(BookingRow::from)
        .collect();
    Ok(Json(BookingsPage { rows }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelForm {
    #[serde(default)]
    booking_id: Option<String>,
}

#[derive(Serialize)]
struct Cancelled {
    ok: bool,
}

async fn admin_cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<CancelForm>,
) -> Result<Json<Cancelled>, ApiError> {
    require_admin(&state.gate, &headers)?;

    let Some(raw_id) = form.booking_id else {
        return Err(ApiError::MissingFields);
    };
    // An unparseable id can't name any booking; same idempotent no-op as
    // an unknown one.
    if let Ok(id) = Ulid::from_string(&raw_id)
        && state.engine.cancel_booking(id).await?
    {
        metrics::counter!(observability::CANCELLATIONS_TOTAL).increment(1);
    }
    Ok(Json(Cancelled { ok: true }))
}
