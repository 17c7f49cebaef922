//! Bookings repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::BookingStore;
use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, NewBooking},
};

/// SQLSTATE raised by the `bookings_no_overlap` exclusion constraint
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Translate an exclusion violation into a domain conflict
fn map_create_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return AppError::Conflict("Booking overlaps an active booking".to_string());
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl BookingStore for BookingsRepository {
    async fn create(&self, booking: &NewBooking) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (start_at, end_at, client_name, client_phone, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(booking.start_at)
        .bind(booking.end_at)
        .bind(&booking.client_name)
        .bind(&booking.client_phone)
        .bind(&booking.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(map_create_error)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn list_by_range(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE tstzrange(start_at, end_at, '[)') && tstzrange($1, $2, '[)')
            ORDER BY start_at ASC
            "#,
        )
        .bind(range_start)
        .bind(range_end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn cancel(&self, id: Uuid, now: DateTime<Utc>, reason: Option<String>) -> AppResult<Booking> {
        // Stamps are written only on the active -> cancelled transition
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'cancelled',
                cancelled_at = CASE WHEN status = 'active' THEN $2 ELSE cancelled_at END,
                cancel_reason = CASE WHEN status = 'active' THEN $3 ELSE cancel_reason END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
