//! Calendar rules compiler
//!
//! Turns the raw `[rules]` configuration section into [`CalendarRules`], the
//! only representation the rest of the engine works with. Inconsistent
//! settings are rejected here, at startup.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use regex::Regex;
use thiserror::Error;

use crate::{config::RulesConfig, error::ValidationError};

/// The only slot granularity the studio supports
pub const SUPPORTED_SLOT_MINUTES: i64 = 30;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Widest window `NaiveDate` arithmetic can represent
const MAX_WINDOW_DAYS: i64 = 365 * 500_000;

pub const DATE_OUT_OF_RANGE: &str = "Date is out of range";

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("{field} must be HH:MM between 00:00 and 23:59, got {value:?}")]
    InvalidClock { field: &'static str, value: String },

    #[error("work_end must be after work_start")]
    EmptyWorkDay,

    #[error("slot_minutes must be 30, got {0}")]
    UnsupportedSlot(i64),

    #[error("booking_window_days must be between 1 and 182500000, got {0}")]
    InvalidBookingWindow(i64),

    #[error("max_session_minutes must be a positive multiple of slot_minutes, got {0}")]
    InvalidMaxSession(i64),

    #[error("invalid phone_pattern: {0}")]
    InvalidPhonePattern(#[from] regex::Error),
}

/// Compiled, immutable calendar rules
#[derive(Debug, Clone)]
pub struct CalendarRules {
    tz: Tz,
    booking_window_days: i64,
    work_start_min: i64,
    work_end_min: i64,
    slot_minutes: i64,
    max_session_minutes: i64,
    phone_pattern: Regex,
}

impl CalendarRules {
    pub fn compile(cfg: &RulesConfig) -> Result<Self, RulesError> {
        let tz: Tz = cfg
            .timezone
            .parse()
            .map_err(|_| RulesError::UnknownTimezone(cfg.timezone.clone()))?;

        let work_start_min = parse_hhmm(&cfg.work_start).ok_or_else(|| RulesError::InvalidClock {
            field: "work_start",
            value: cfg.work_start.clone(),
        })?;
        let work_end_min = parse_hhmm(&cfg.work_end).ok_or_else(|| RulesError::InvalidClock {
            field: "work_end",
            value: cfg.work_end.clone(),
        })?;
        if work_end_min <= work_start_min {
            return Err(RulesError::EmptyWorkDay);
        }

        if cfg.slot_minutes != SUPPORTED_SLOT_MINUTES {
            return Err(RulesError::UnsupportedSlot(cfg.slot_minutes));
        }
        if cfg.booking_window_days <= 0 || cfg.booking_window_days > MAX_WINDOW_DAYS {
            return Err(RulesError::InvalidBookingWindow(cfg.booking_window_days));
        }
        if cfg.max_session_minutes < cfg.slot_minutes
            || cfg.max_session_minutes % cfg.slot_minutes != 0
        {
            return Err(RulesError::InvalidMaxSession(cfg.max_session_minutes));
        }

        let phone_pattern = Regex::new(&cfg.phone_pattern)?;

        Ok(Self {
            tz,
            booking_window_days: cfg.booking_window_days,
            work_start_min,
            work_end_min,
            slot_minutes: cfg.slot_minutes,
            max_session_minutes: cfg.max_session_minutes,
            phone_pattern,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn booking_window_days(&self) -> i64 {
        self.booking_window_days
    }

    pub fn work_start_minutes(&self) -> i64 {
        self.work_start_min
    }

    pub fn work_end_minutes(&self) -> i64 {
        self.work_end_min
    }

    pub fn slot_minutes(&self) -> i64 {
        self.slot_minutes
    }

    pub fn max_session_minutes(&self) -> i64 {
        self.max_session_minutes
    }

    pub fn phone_pattern(&self) -> &Regex {
        &self.phone_pattern
    }

    /// Civil date of `now` in the studio timezone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Start of the civil day `date` in the studio timezone, `None` when
    /// the day lies outside the representable range
    pub fn local_midnight(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        resolve_local(&self.tz, date.and_time(chrono::NaiveTime::MIN))
    }

    /// Half-open UTC range `[midnight, next midnight)` covering the civil day
    pub fn day_bounds(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.local_midnight(date)?;
        let end = self.local_midnight(date.succ_opt()?)?;
        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    /// Instant that is `minutes` after the local midnight of `date`
    pub fn at_minutes(&self, date: NaiveDate, minutes: i64) -> Option<DateTime<Tz>> {
        self.local_midnight(date)?
            .checked_add_signed(Duration::minutes(minutes))
    }

    /// Local `[workStart, workEnd)` window of the civil day
    pub fn work_window(&self, date: NaiveDate) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        Some((
            self.at_minutes(date, self.work_start_min)?,
            self.at_minutes(date, self.work_end_min)?,
        ))
    }

    /// Date must be representable, today or later, within the booking window
    /// and a weekday
    pub fn check_date(&self, date: NaiveDate, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.day_bounds(date).is_none() {
            return Err(ValidationError::single("date", DATE_OUT_OF_RANGE));
        }

        let today = self.today(now);
        if date < today {
            return Err(ValidationError::single("date", "Date cannot be in the past"));
        }

        // A window reaching past the calendar has no upper limit
        let limit = today.checked_add_signed(Duration::days(self.booking_window_days));
        if limit.is_some_and(|limit| date > limit) {
            return Err(ValidationError::single(
                "date",
                format!("Date must be within {} days from today", self.booking_window_days),
            ));
        }

        match date.weekday() {
            Weekday::Sat | Weekday::Sun => {
                Err(ValidationError::single("date", "Only weekdays are available"))
            }
            _ => Ok(()),
        }
    }
}

/// Parse a strict `HH:MM` clock label into minutes since midnight
pub fn parse_hhmm(s: &str) -> Option<i64> {
    let b = s.as_bytes();
    if b.len() != 5 || b[2] != b':' {
        return None;
    }
    let digits = [b[0], b[1], b[3], b[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let d = |c: u8| (c - b'0') as i64;
    let hh = d(b[0]) * 10 + d(b[1]);
    let mm = d(b[3]) * 10 + d(b[4]);
    if hh > 23 || mm > 59 {
        return None;
    }
    Some(hh * 60 + mm)
}

/// Render minutes since midnight as `HH:MM`
pub fn format_hhmm(minutes: i64) -> String {
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Resolve a local wall-clock time. Ambiguous times take the earlier
/// instant; times skipped by a forward transition are read with the offset
/// in effect before it, landing after the gap.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = tz.offset_from_utc_datetime(&naive.checked_sub_signed(Duration::days(1))?);
            let offset_secs = i64::from(before.fix().local_minus_utc());
            let utc = naive.checked_sub_signed(Duration::seconds(offset_secs))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moscow_rules() -> RulesConfig {
        RulesConfig::default()
    }

    #[test]
    fn compiles_default_configuration() {
        let rules = CalendarRules::compile(&moscow_rules()).unwrap();

        assert_eq!(rules.timezone(), chrono_tz::Europe::Moscow);
        assert_eq!(rules.work_start_minutes(), 540);
        assert_eq!(rules.work_end_minutes(), 1080);
        assert_eq!(rules.slot_minutes(), 30);
        assert_eq!(rules.max_session_minutes(), 180);
    }

    #[test]
    fn rejects_inconsistent_configuration() {
        let bad = [
            RulesConfig { timezone: "Mars/Olympus".into(), ..moscow_rules() },
            RulesConfig { work_start: "9:00".into(), ..moscow_rules() },
            RulesConfig { work_end: "24:00".into(), ..moscow_rules() },
            RulesConfig { work_end: "09:00".into(), ..moscow_rules() },
            RulesConfig { slot_minutes: 15, ..moscow_rules() },
            RulesConfig { booking_window_days: 0, ..moscow_rules() },
            RulesConfig { booking_window_days: 200_000_000_000, ..moscow_rules() },
            RulesConfig { max_session_minutes: 45, ..moscow_rules() },
            RulesConfig { max_session_minutes: 0, ..moscow_rules() },
            RulesConfig { phone_pattern: "(".into(), ..moscow_rules() },
        ];
        for cfg in bad {
            assert!(CalendarRules::compile(&cfg).is_err(), "accepted {:?}", cfg);
        }
    }

    #[test]
    fn parses_strict_clock_labels() {
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("10:30"), Some(630));
        for bad in ["", "9:00", "10:5", "10-00", "aa:bb", "24:00", "12:60", " 10:00", "+1:00"] {
            assert_eq!(parse_hhmm(bad), None, "{bad}");
        }
        assert_eq!(format_hhmm(630), "10:30");
    }

    #[test]
    fn day_bounds_follow_the_studio_timezone() {
        let rules = CalendarRules::compile(&moscow_rules()).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let (start, end) = rules.day_bounds(date).unwrap();

        assert_eq!(start.to_rfc3339(), "2026-10-18T21:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-10-19T21:00:00+00:00");
    }

    #[test]
    fn calendar_edges_have_no_day_bounds() {
        let rules = CalendarRules::compile(&moscow_rules()).unwrap();

        assert!(rules.day_bounds(NaiveDate::MIN).is_none());
        assert!(rules.day_bounds(NaiveDate::MAX).is_none());
        assert!(rules.work_window(NaiveDate::MIN).is_none());
    }

    #[test]
    fn widest_window_never_overflows() {
        let cfg = RulesConfig { booking_window_days: MAX_WINDOW_DAYS, ..moscow_rules() };
        let rules = CalendarRules::compile(&cfg).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        assert!(rules.check_date(monday, now).is_ok());
        // 200000-01-03 is a Monday
        let far = NaiveDate::from_ymd_opt(200_000, 1, 3).unwrap();
        assert!(rules.check_date(far, now).is_ok());

        for edge in [NaiveDate::MIN, NaiveDate::MAX] {
            let err = rules.check_date(edge, now).unwrap_err();
            assert_eq!(err.fields[0].message, DATE_OUT_OF_RANGE);
        }
    }

    #[test]
    fn midnight_skipped_by_dst_resolves_after_the_gap() {
        // Havana springs forward at 00:00 -> 01:00
        let cfg = RulesConfig { timezone: "America/Havana".into(), ..moscow_rules() };
        let rules = CalendarRules::compile(&cfg).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();

        let midnight = rules.local_midnight(date).unwrap();

        assert_eq!(midnight.date_naive(), date);
        assert_eq!(midnight.format("%H:%M").to_string(), "01:00");
    }

    #[test]
    fn date_window_boundaries() {
        let rules = CalendarRules::compile(&moscow_rules()).unwrap();
        // Wednesday 2026-10-14 12:00 Moscow
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
        let today = rules.today(now);

        // today + 90 is Tuesday 2027-01-12, the day after is a Wednesday
        let last = today + Duration::days(90);
        assert_eq!(last.weekday(), Weekday::Tue);
        assert!(rules.check_date(last, now).is_ok());

        let beyond = rules.check_date(last + Duration::days(1), now).unwrap_err();
        assert!(beyond.fields[0].message.contains("within 90 days"));

        let yesterday = rules.check_date(today - Duration::days(1), now).unwrap_err();
        assert!(yesterday.has_field("date"));
        assert!(rules.check_date(today, now).is_ok());
    }

    #[test]
    fn weekends_are_rejected() {
        let rules = CalendarRules::compile(&moscow_rules()).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();

        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        assert!(rules.check_date(saturday, now).is_err());
        assert!(rules.check_date(sunday, now).is_err());
        assert!(rules.check_date(monday, now).is_ok());
    }
}
