//! Booking model and the request/response types built around it

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Booking lifecycle status. `Active -> Cancelled` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown booking status: {0}")]
pub struct UnknownStatus(String);

impl TryFrom<String> for BookingStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(BookingStatus::Active),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(UnknownStatus(value)),
        }
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// Booking record from database. Instants are UTC.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub client_name: String,
    pub client_phone: String,
    pub comment: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_at - self.start_at).num_minutes()
    }

    /// Half-open interval test against `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_at < end && start < self.end_at
    }
}

/// A validated booking ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub client_name: String,
    pub client_phone: String,
    pub comment: Option<String>,
}

/// Booking creation input as seen by the booking service
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    /// Civil date in the studio timezone
    pub date: NaiveDate,
    /// Local start time (HH:MM)
    pub start_time: String,
    pub duration_minutes: i64,
    pub client_name: String,
    pub client_phone: String,
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBookingRequest {
    /// Booking date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Start time (HH:MM, studio local time)
    pub start_time: String,
    pub duration_minutes: i64,
    pub name: String,
    /// Phone number, checked against the configured pattern
    pub phone: String,
    pub comment: Option<String>,
}

impl From<CreateBookingRequest> for CreateBookingInput {
    fn from(req: CreateBookingRequest) -> Self {
        Self {
            date: req.date,
            start_time: req.start_time,
            duration_minutes: req.duration_minutes,
            client_name: req.name,
            client_phone: req.phone,
            comment: req.comment,
        }
    }
}

/// Cancel booking request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

/// Query parameters carrying a civil date
#[derive(Debug, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// Status filter for the admin listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Cancelled,
}

impl StatusFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => booking.status == BookingStatus::Active,
            StatusFilter::Cancelled => booking.status == BookingStatus::Cancelled,
        }
    }
}

/// Query parameters for the admin listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct AdminBookingsQuery {
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// all, active or cancelled (default: all)
    #[param(inline)]
    pub status: Option<StatusFilter>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Free slots for a date
#[derive(Debug, Serialize, ToSchema)]
pub struct FreeSlotsResponse {
    pub date: NaiveDate,
    /// Free slot start times (HH:MM, studio local time)
    pub free_slots: Vec<String>,
}

/// Booking interval rendered in studio local time
struct LocalSpan {
    date: NaiveDate,
    start_time: String,
    end_time: String,
    duration_minutes: i64,
}

impl LocalSpan {
    fn of(booking: &Booking, tz: Tz) -> Self {
        let start = booking.start_at.with_timezone(&tz);
        let end = booking.end_at.with_timezone(&tz);
        Self {
            date: start.date_naive(),
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            duration_minutes: booking.duration_minutes(),
        }
    }
}

/// Response for a created booking
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreateResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl BookingCreateResponse {
    pub fn new(booking: &Booking, tz: Tz) -> Self {
        let span = LocalSpan::of(booking, tz);
        Self {
            id: booking.id,
            date: span.date,
            start_time: span.start_time,
            end_time: span.end_time,
            duration_minutes: span.duration_minutes,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Booking row of the admin listing
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingSummary {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub client_name: String,
    pub client_phone: String,
    pub comment: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl BookingSummary {
    pub fn new(booking: &Booking, tz: Tz) -> Self {
        let span = LocalSpan::of(booking, tz);
        Self {
            id: booking.id,
            date: span.date,
            start_time: span.start_time,
            end_time: span.end_time,
            duration_minutes: span.duration_minutes,
            client_name: booking.client_name.clone(),
            client_phone: booking.client_phone.clone(),
            comment: booking.comment.clone(),
            status: booking.status,
            created_at: booking.created_at,
            cancelled_at: booking.cancelled_at,
        }
    }
}

/// Full booking details
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub summary: BookingSummary,
    pub cancel_reason: Option<String>,
}

impl BookingDetail {
    pub fn new(booking: &Booking, tz: Tz) -> Self {
        Self {
            summary: BookingSummary::new(booking, tz),
            cancel_reason: booking.cancel_reason.clone(),
        }
    }
}

/// Bookings of one civil day
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminBookingsResponse {
    pub date: NaiveDate,
    pub items: Vec<BookingSummary>,
}
