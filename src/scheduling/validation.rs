//! Booking request validation

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use super::{
    rules::{parse_hhmm, DATE_OUT_OF_RANGE},
    CalendarRules,
};
use crate::{
    error::ValidationError,
    models::booking::{CreateBookingInput, NewBooking},
};

/// Phone number matches the accepted pattern
pub fn phone_matches(pattern: &Regex, phone: &str) -> bool {
    pattern.is_match(phone)
}

/// Validate a booking request and derive its UTC interval.
///
/// The date check runs first and short-circuits. Field checks are then
/// collected together; the checks on the derived interval (closing time,
/// start in the past) only run once the fields are valid.
pub fn validate_booking(
    rules: &CalendarRules,
    now: DateTime<Utc>,
    input: &CreateBookingInput,
) -> Result<NewBooking, ValidationError> {
    rules.check_date(input.date, now)?;

    let mut verr = ValidationError::new();

    let client_name = input.client_name.trim();
    if client_name.is_empty() {
        verr = verr.add("name", "Name is required");
    }
    if !phone_matches(rules.phone_pattern(), &input.client_phone) {
        verr = verr.add("phone", "Phone number format is not accepted");
    }

    let slot = rules.slot_minutes();
    let start_min = parse_hhmm(&input.start_time);
    match start_min {
        None => verr = verr.add("start_time", "Time must be in the format HH:MM"),
        Some(min) => {
            if min % slot != 0 {
                verr = verr.add("start_time", format!("Time must be a multiple of {} minutes", slot));
            }
            if min < rules.work_start_minutes() || min >= rules.work_end_minutes() {
                verr = verr.add("start_time", "Time must be within working hours");
            }
        }
    }

    let duration = input.duration_minutes;
    if duration < slot || duration % slot != 0 {
        verr = verr.add(
            "duration_minutes",
            format!("Duration must be a multiple of {} minutes and at least {}", slot, slot),
        );
    } else if duration > rules.max_session_minutes() {
        verr = verr.add(
            "duration_minutes",
            format!("Duration must not exceed {} minutes", rules.max_session_minutes()),
        );
    }

    let start_min = match start_min {
        Some(min) if verr.is_empty() => min,
        _ => return Err(verr),
    };

    let interval = rules.at_minutes(input.date, start_min).and_then(|start| {
        let end = start.checked_add_signed(Duration::minutes(duration))?;
        let (_, work_end) = rules.work_window(input.date)?;
        Some((start, end, work_end))
    });
    let Some((start, end, work_end)) = interval else {
        return Err(ValidationError::single("date", DATE_OUT_OF_RANGE));
    };

    if end > work_end {
        verr = verr.add("duration_minutes", "Booking must end within working hours");
    }
    if input.date == rules.today(now) && start.with_timezone(&Utc) < now {
        verr = verr.add("start_time", "Cannot book a time in the past");
    }
    if !verr.is_empty() {
        return Err(verr);
    }

    Ok(NewBooking {
        start_at: start.with_timezone(&Utc),
        end_at: end.with_timezone(&Utc),
        client_name: client_name.to_string(),
        client_phone: input.client_phone.clone(),
        comment: input.comment.clone(),
    })
}
