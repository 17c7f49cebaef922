//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use studio_booking::{
    api,
    config::{AdminConfig, AppConfig},
    error::{AppError, AppResult},
    metrics::Metrics,
    models::{Booking, BookingStatus, NewBooking},
    repository::BookingStore,
    scheduling::{CalendarRules, FixedClock},
    services::Services,
    AppState,
};

pub const ADMIN_PASSWORD: &str = "studio-secret";

/// Friday 2026-10-16, 12:00 in Moscow
pub fn friday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
}

/// In-memory store that rejects overlapping active bookings under one lock
#[derive(Default)]
pub struct InMemoryStore {
    bookings: Mutex<Vec<Booking>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn active_count(&self) -> usize {
        self.bookings.lock().unwrap().iter().filter(|b| b.is_active()).count()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn create(&self, booking: &NewBooking) -> AppResult<Booking> {
        self.check_available()?;
        let mut bookings = self.bookings.lock().unwrap();

        if bookings
            .iter()
            .any(|b| b.is_active() && b.overlaps(booking.start_at, booking.end_at))
        {
            return Err(AppError::Conflict("Booking overlaps an active booking".to_string()));
        }

        let created = Booking {
            id: Uuid::new_v4(),
            start_at: booking.start_at,
            end_at: booking.end_at,
            client_name: booking.client_name.clone(),
            client_phone: booking.client_phone.clone(),
            comment: booking.comment.clone(),
            status: BookingStatus::Active,
            created_at: friday_noon(),
            cancelled_at: None,
            cancel_reason: None,
        };
        bookings.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Booking> {
        self.check_available()?;
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn list_by_range(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.check_available()?;
        let mut items: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.overlaps(range_start, range_end))
            .cloned()
            .collect();
        items.sort_by_key(|b| b.start_at);
        Ok(items)
    }

    async fn cancel(&self, id: Uuid, now: DateTime<Utc>, reason: Option<String>) -> AppResult<Booking> {
        self.check_available()?;
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

        if booking.is_active() {
            booking.status = BookingStatus::Cancelled;
            booking.cancelled_at = Some(now);
            booking.cancel_reason = reason;
        }
        Ok(booking.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig {
            server: Default::default(),
            database: Default::default(),
            admin: AdminConfig {
                password: ADMIN_PASSWORD.to_string(),
                ..Default::default()
            },
            logging: Default::default(),
            rules: Default::default(),
        };
        let rules = CalendarRules::compile(&config.rules).unwrap();
        let store = Arc::new(InMemoryStore::default());
        let services = Services::new(store.clone(), rules, Arc::new(FixedClock(friday_noon())));

        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
            metrics: Metrics::new().unwrap(),
        };

        Self {
            router: api::router(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> (u16, Value) {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        into_parts(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> (u16, Value) {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        into_parts(self.send(builder.body(Body::from(body.to_string())).unwrap()).await).await
    }

    /// Log in as admin and return the `name=value` cookie pair
    pub async fn login(&self) -> String {
        let request = Request::post("/api/admin/session/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "password": ADMIN_PASSWORD }).to_string()))
            .unwrap();
        let response = self.send(request).await;
        assert_eq!(response.status(), 204);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

pub async fn into_parts(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
