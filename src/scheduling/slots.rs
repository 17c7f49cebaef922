//! Slot calculator

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use super::CalendarRules;
use crate::models::booking::Booking;

/// Candidate slot starts of the civil day, in chronological order.
///
/// Slots start at `workStart` and step by the slot granularity while the
/// whole slot still ends by `workEnd`. A day outside the calendar has none.
pub fn candidate_slots(rules: &CalendarRules, date: NaiveDate) -> Vec<DateTime<Tz>> {
    let Some((work_start, work_end)) = rules.work_window(date) else {
        return Vec::new();
    };
    let step = Duration::minutes(rules.slot_minutes());

    let capacity = (rules.work_end_minutes() - rules.work_start_minutes()) / rules.slot_minutes();
    let mut slots = Vec::with_capacity(capacity as usize);

    let mut slot = work_start;
    while slot + step <= work_end {
        slots.push(slot);
        slot = slot + step;
    }
    slots
}

/// `[start, end)` overlaps no active booking. Cancelled bookings never block.
pub fn is_slot_free(start: DateTime<Utc>, end: DateTime<Utc>, bookings: &[Booking]) -> bool {
    bookings
        .iter()
        .filter(|b| b.is_active())
        .all(|b| !b.overlaps(start, end))
}

/// Free slot labels (`HH:MM`, studio local time) of `date`.
///
/// `bookings` are the bookings overlapping the civil day. On the current
/// civil day slots starting before `now` are dropped. The date itself is
/// expected to have passed [`CalendarRules::check_date`].
pub fn free_slots(
    rules: &CalendarRules,
    date: NaiveDate,
    now: DateTime<Utc>,
    bookings: &[Booking],
) -> Vec<String> {
    let is_today = date == rules.today(now);
    let step = Duration::minutes(rules.slot_minutes());

    candidate_slots(rules, date)
        .into_iter()
        .filter(|slot| {
            let start = slot.with_timezone(&Utc);
            if is_today && start < now {
                return false;
            }
            is_slot_free(start, start + step, bookings)
        })
        .map(|slot| slot.format("%H:%M").to_string())
        .collect()
}
