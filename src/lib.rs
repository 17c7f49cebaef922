//! Studio booking server
//!
//! Manages appointment slots for a single-resource studio: computes free
//! slots, validates and creates bookings, and cancels them under calendar
//! rules expressed in the studio's civil timezone.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub metrics: metrics::Metrics,
}
