//! Booking service
//!
//! Sequences validation, slot computation and storage calls. This is the
//! only component that talks to the [`BookingStore`]; the store is the
//! authority on overlaps, so a conflict surfaces here as
//! `AppError::Conflict` even when validation passed.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{AppResult, ValidationError},
    models::booking::{Booking, CreateBookingInput},
    repository::BookingStore,
    scheduling::{rules::DATE_OUT_OF_RANGE, slots, validation, CalendarRules, Clock},
};

#[derive(Clone)]
pub struct BookingsService {
    store: Arc<dyn BookingStore>,
    rules: Arc<CalendarRules>,
    clock: Arc<dyn Clock>,
}

impl BookingsService {
    pub fn new(store: Arc<dyn BookingStore>, rules: Arc<CalendarRules>, clock: Arc<dyn Clock>) -> Self {
        Self { store, rules, clock }
    }

    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn day_bounds(&self, date: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        self.rules
            .day_bounds(date)
            .ok_or_else(|| ValidationError::single("date", DATE_OUT_OF_RANGE).into())
    }

    /// Free slot start times of a civil date
    pub async fn get_free_slots(&self, date: NaiveDate) -> AppResult<Vec<String>> {
        let now = self.clock.now();
        tracing::debug!(%date, "get_free_slots start");

        if let Err(verr) = self.rules.check_date(date, now) {
            tracing::info!(%date, error = %verr, "get_free_slots validation failed");
            return Err(verr.into());
        }

        let (day_start, day_end) = self.day_bounds(date)?;
        let bookings = self
            .store
            .list_by_range(day_start, day_end)
            .await
            .inspect_err(|e| tracing::error!(%date, error = %e, "get_free_slots list_by_range failed"))?;

        let free = slots::free_slots(&self.rules, date, now, &bookings);
        tracing::debug!(%date, free_slots = free.len(), "get_free_slots done");
        Ok(free)
    }

    /// Validate and persist a new booking
    pub async fn create_booking(&self, input: CreateBookingInput) -> AppResult<Booking> {
        let now = self.clock.now();
        tracing::info!(
            date = %input.date,
            start_time = %input.start_time,
            duration_min = input.duration_minutes,
            "create_booking start"
        );

        let new_booking = match validation::validate_booking(&self.rules, now, &input) {
            Ok(b) => b,
            Err(verr) => {
                tracing::info!(date = %input.date, error = %verr, "create_booking validation failed");
                return Err(verr.into());
            }
        };

        let created = self.store.create(&new_booking).await.inspect_err(|e| {
            tracing::info!(
                date = %input.date,
                start_time = %input.start_time,
                duration_min = input.duration_minutes,
                error = %e,
                "create_booking failed"
            )
        })?;

        tracing::info!(
            booking_id = %created.id,
            date = %input.date,
            start_time = %input.start_time,
            duration_min = input.duration_minutes,
            "create_booking success"
        );
        Ok(created)
    }

    /// All bookings (any status) overlapping a civil date, ascending by start
    pub async fn list_bookings_by_date(&self, date: NaiveDate) -> AppResult<Vec<Booking>> {
        tracing::debug!(%date, "list_bookings_by_date start");

        let (day_start, day_end) = self.day_bounds(date).inspect_err(|e| {
            tracing::info!(%date, error = %e, "list_bookings_by_date validation failed")
        })?;
        let items = self
            .store
            .list_by_range(day_start, day_end)
            .await
            .inspect_err(|e| tracing::error!(%date, error = %e, "list_bookings_by_date failed"))?;

        tracing::debug!(%date, items = items.len(), "list_bookings_by_date done");
        Ok(items)
    }

    pub async fn get_booking(&self, id: Uuid) -> AppResult<Booking> {
        tracing::debug!(booking_id = %id, "get_booking start");
        self.store
            .get_by_id(id)
            .await
            .inspect_err(|e| tracing::info!(booking_id = %id, error = %e, "get_booking failed"))
    }

    /// Cancel a booking. Cancelling twice returns the first cancellation unchanged.
    pub async fn cancel_booking(&self, id: Uuid, reason: Option<String>) -> AppResult<Booking> {
        tracing::info!(booking_id = %id, "cancel_booking start");

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let booking = self
            .store
            .cancel(id, self.clock.now(), reason)
            .await
            .inspect_err(|e| tracing::info!(booking_id = %id, error = %e, "cancel_booking failed"))?;

        tracing::info!(booking_id = %id, status = %booking.status, "cancel_booking success");
        Ok(booking)
    }

    /// Storage readiness
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
