//! Business logic services

pub mod bookings;
pub mod sessions;

use std::sync::Arc;

use crate::{
    repository::BookingStore,
    scheduling::{CalendarRules, Clock},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
    pub sessions: sessions::SessionStore,
}

impl Services {
    /// Create all services over the given booking store
    pub fn new(store: Arc<dyn BookingStore>, rules: CalendarRules, clock: Arc<dyn Clock>) -> Self {
        Self {
            bookings: bookings::BookingsService::new(store, Arc::new(rules), clock),
            sessions: sessions::SessionStore::new(),
        }
    }
}
