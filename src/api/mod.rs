//! API handlers for the studio booking REST endpoints

pub mod admin;
pub mod health;
pub mod openapi;
pub mod public;

use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{error::AppError, metrics, AppState};

/// Extractor for a logged-in admin, backed by the session cookie
pub struct AdminSession(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        match jar.get(&state.config.admin.session_cookie_name) {
            Some(cookie)
                if !cookie.value().is_empty() && state.services.sessions.exists(cookie.value()) =>
            {
                Ok(AdminSession(cookie.value().to_string()))
            }
            _ => {
                tracing::info!(method = %parts.method, path = %parts.uri.path(), "admin unauthorized");
                Err(AppError::Authentication("Admin login required".to_string()))
            }
        }
    }
}

/// Create the application router with all routes and layers
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Public
        .route("/public/config", get(public::get_public_config))
        .route("/public/slots", get(public::get_free_slots))
        .route("/public/bookings", post(public::create_booking))
        // Admin
        .route("/admin/session/login", post(admin::login))
        .route("/admin/session/logout", post(admin::logout))
        .route("/admin/bookings", get(admin::list_bookings))
        .route("/admin/bookings/:id", get(admin::get_booking))
        .route("/admin/bookings/:id/cancel", post(admin::cancel_booking))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state.metrics.clone());

    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .nest("/api", api)
        .merge(metrics_routes)
        .merge(openapi::create_openapi_router())
        .layer(middleware::from_fn_with_state(state.metrics.clone(), metrics::track))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&state.config.server.cors_allowed_origins))
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static("x-request-id")])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}
