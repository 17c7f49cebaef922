//! Data models for the studio booking server

pub mod booking;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, CreateBookingInput, NewBooking};
