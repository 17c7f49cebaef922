//! Booking scheduling engine
//!
//! Compiles calendar rules, enumerates bookable slots for a civil date and
//! validates booking requests. Everything in here is a pure function of the
//! compiled rules, the current instant and its inputs; storage access lives
//! in [`crate::services::bookings`].

pub mod clock;
pub mod rules;
pub mod slots;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use rules::{CalendarRules, RulesError};
