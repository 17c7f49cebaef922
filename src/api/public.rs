//! Public booking endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::booking::{BookingCreateResponse, CreateBookingRequest, DateQuery, FreeSlotsResponse},
    scheduling::rules::format_hhmm,
    AppState,
};

/// Calendar rules as published to booking clients
#[derive(Serialize, ToSchema)]
pub struct PublicConfigResponse {
    /// IANA timezone of the studio
    pub timezone: String,
    pub booking_window_days: i64,
    /// ISO weekdays open for booking (1 = Monday)
    pub work_days: Vec<u32>,
    /// Opening time (HH:MM)
    pub work_start: String,
    /// Closing time (HH:MM)
    pub work_end: String,
    pub slot_minutes: i64,
    pub max_session_minutes: i64,
    pub server_time: DateTime<Utc>,
}

/// Studio calendar configuration
#[utoipa::path(
    get,
    path = "/public/config",
    tag = "public",
    responses(
        (status = 200, description = "Calendar configuration", body = PublicConfigResponse)
    )
)]
pub async fn get_public_config(State(state): State<AppState>) -> Json<PublicConfigResponse> {
    let service = &state.services.bookings;
    let rules = service.rules();

    Json(PublicConfigResponse {
        timezone: rules.timezone().name().to_string(),
        booking_window_days: rules.booking_window_days(),
        work_days: vec![1, 2, 3, 4, 5],
        work_start: format_hhmm(rules.work_start_minutes()),
        work_end: format_hhmm(rules.work_end_minutes()),
        slot_minutes: rules.slot_minutes(),
        max_session_minutes: rules.max_session_minutes(),
        server_time: service.now(),
    })
}

/// Free slot start times for a date
#[utoipa::path(
    get,
    path = "/public/slots",
    tag = "public",
    params(DateQuery),
    responses(
        (status = 200, description = "Free slots", body = FreeSlotsResponse),
        (status = 400, description = "Malformed date", body = crate::error::ErrorResponse),
        (status = 422, description = "Date not bookable", body = crate::error::ValidationErrorResponse)
    )
)]
pub async fn get_free_slots(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> AppResult<Json<FreeSlotsResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let free_slots = state.services.bookings.get_free_slots(query.date).await?;

    Ok(Json(FreeSlotsResponse {
        date: query.date,
        free_slots,
    }))
}

/// Create a booking
#[utoipa::path(
    post,
    path = "/public/bookings",
    tag = "public",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingCreateResponse),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 409, description = "Time already taken", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid booking", body = crate::error::ValidationErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    request: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookingCreateResponse>)> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let service = &state.services.bookings;

    let booking = service.create_booking(request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreateResponse::new(&booking, service.rules().timezone())),
    ))
}
