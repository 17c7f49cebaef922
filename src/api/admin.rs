//! Admin endpoints: session login and booking management

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::AdminSession;
use crate::{
    error::{AppError, AppResult},
    models::booking::{
        AdminBookingsQuery, AdminBookingsResponse, BookingDetail, BookingSummary, CancelBookingRequest,
    },
    AppState,
};

/// Admin login request
#[derive(Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Byte comparison whose running time does not depend on where inputs differ
fn password_matches(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn parse_id(id: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    id.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Open an admin session
#[utoipa::path(
    post,
    path = "/admin/session/login",
    tag = "admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 204, description = "Logged in, session cookie set"),
        (status = 401, description = "Wrong password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> AppResult<(StatusCode, CookieJar)> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let admin = &state.config.admin;

    if !password_matches(&request.password, &admin.password) {
        tracing::info!("admin login failed");
        return Err(AppError::Authentication("Invalid password".to_string()));
    }

    let session_id = state.services.sessions.create()?;
    let cookie = Cookie::build((admin.session_cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(admin.secure_cookie)
        .build();

    tracing::info!("admin login");
    Ok((StatusCode::NO_CONTENT, jar.add(cookie)))
}

/// Close the current admin session
#[utoipa::path(
    post,
    path = "/admin/session/logout",
    tag = "admin",
    responses(
        (status = 204, description = "Logged out")
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let name = state.config.admin.session_cookie_name.clone();

    if let Some(cookie) = jar.get(&name) {
        state.services.sessions.remove(cookie.value());
    }

    let removal = Cookie::build((name, "")).path("/").build();
    (StatusCode::NO_CONTENT, jar.remove(removal))
}

/// Bookings of a civil date
#[utoipa::path(
    get,
    path = "/admin/bookings",
    tag = "admin",
    params(AdminBookingsQuery),
    responses(
        (status = 200, description = "Bookings of the day", body = AdminBookingsResponse),
        (status = 400, description = "Malformed query", body = crate::error::ErrorResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    _session: AdminSession,
    query: Result<Query<AdminBookingsQuery>, QueryRejection>,
) -> AppResult<Json<AdminBookingsResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let service = &state.services.bookings;
    let tz = service.rules().timezone();
    let filter = query.status.unwrap_or_default();

    let items = service
        .list_bookings_by_date(query.date)
        .await?
        .iter()
        .filter(|b| filter.matches(b))
        .map(|b| BookingSummary::new(b, tz))
        .collect();

    Ok(Json(AdminBookingsResponse {
        date: query.date,
        items,
    }))
}

/// Booking details
#[utoipa::path(
    get,
    path = "/admin/bookings/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = BookingDetail),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    _session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<BookingDetail>> {
    let id = parse_id(id)?;
    let service = &state.services.bookings;

    let booking = service.get_booking(id).await?;
    Ok(Json(BookingDetail::new(&booking, service.rules().timezone())))
}

/// Cancel a booking. The body is optional.
#[utoipa::path(
    post,
    path = "/admin/bookings/{id}/cancel",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body(content = CancelBookingRequest, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingDetail),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    _session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> AppResult<Json<BookingDetail>> {
    let id = parse_id(id)?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CancelBookingRequest::default()
    } else {
        serde_json::from_slice::<CancelBookingRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };
    let service = &state.services.bookings;

    let booking = service.cancel_booking(id, request.reason).await?;
    Ok(Json(BookingDetail::new(&booking, service.rules().timezone())))
}
