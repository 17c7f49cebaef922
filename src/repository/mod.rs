//! Repository layer for database operations

pub mod bookings;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::booking::{Booking, NewBooking},
};

/// Storage port used by the booking service.
///
/// Implementations must guarantee that no two active bookings ever overlap,
/// even under concurrent `create` calls, and report a rejected overlap as
/// `AppError::Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new active booking
    async fn create(&self, booking: &NewBooking) -> AppResult<Booking>;

    /// Fetch a booking, `AppError::NotFound` if absent
    async fn get_by_id(&self, id: Uuid) -> AppResult<Booking>;

    /// Bookings of any status intersecting `[range_start, range_end)`, ascending by start
    async fn list_by_range(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;

    /// Cancel an active booking; an already cancelled booking is returned unchanged
    async fn cancel(&self, id: Uuid, now: DateTime<Utc>, reason: Option<String>) -> AppResult<Booking>;

    /// Check the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub bookings: bookings::BookingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            bookings: bookings::BookingsRepository::new(pool.clone()),
            pool,
        }
    }
}
