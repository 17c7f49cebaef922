//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, health, public};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studio Booking API",
        version = "1.0.0",
        description = "Appointment booking for a single-room studio"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Public
        public::get_public_config,
        public::get_free_slots,
        public::create_booking,
        // Admin
        admin::login,
        admin::logout,
        admin::list_bookings,
        admin::get_booking,
        admin::cancel_booking,
    ),
    components(
        schemas(
            // Public
            public::PublicConfigResponse,
            crate::models::booking::FreeSlotsResponse,
            crate::models::booking::CreateBookingRequest,
            crate::models::booking::BookingCreateResponse,
            crate::models::booking::BookingStatus,
            // Admin
            admin::AdminLoginRequest,
            crate::models::booking::StatusFilter,
            crate::models::booking::CancelBookingRequest,
            crate::models::booking::BookingSummary,
            crate::models::booking::BookingDetail,
            crate::models::booking::AdminBookingsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ValidationErrorResponse,
            crate::error::FieldError,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Slot lookup and booking"),
        (name = "admin", description = "Admin session and booking management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
