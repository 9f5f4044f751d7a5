//! Time utilities: wall-clock parsing, local "today" and schedule spans.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::error::{SchedulingError, SchedulingResult};

/// Source of "now". Injected so tests can pin the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Start time assumed when a record has no start time.
pub fn start_of_day() -> NaiveTime {
    NaiveTime::MIN
}

/// End time assumed when a record has no end time (23:59).
pub fn end_of_day() -> NaiveTime {
    NaiveTime::MIN + Duration::minutes(23 * 60 + 59)
}

/// Parse an ISO calendar date ("2025-01-03").
pub fn parse_date(s: &str) -> SchedulingResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| SchedulingError::invalid_input(format!("invalid date '{}': {e}", s.trim())))
}

static CLOCK_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<h>\d{1,2}):?(?P<m>\d{2})\s*$"));

/// Parse a wall-clock time. Accepts "09:00", "9:00" and "0900".
pub fn parse_clock(s: &str) -> SchedulingResult<NaiveTime> {
    let re = CLOCK_RE
        .as_ref()
        .map_err(|e| SchedulingError::invalid_input(e.to_string()))?;

    let caps = re
        .captures(s)
        .ok_or_else(|| SchedulingError::invalid_input(format!("invalid time '{}'", s.trim())))?;

    let hour: u32 = caps["h"].parse().unwrap_or(u32::MAX);
    let minute: u32 = caps["m"].parse().unwrap_or(u32::MAX);

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| SchedulingError::invalid_input(format!("time out of range '{}'", s.trim())))
}

/// Format a wall-clock time as "HH:MM".
pub fn format_clock(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

fn parse_tz(tz: &str) -> SchedulingResult<Tz> {
    tz.parse()
        .map_err(|_| SchedulingError::InvalidTimezone(tz.to_string()))
}

/// Wall-clock "now" in an IANA timezone like "America/Chicago".
pub fn local_now(tz: &str, now: DateTime<Utc>) -> SchedulingResult<NaiveDateTime> {
    let tz = parse_tz(tz)?;
    Ok(now.with_timezone(&tz).naive_local())
}

/// Calendar date of `now` in an IANA timezone.
pub fn local_today(tz: &str, now: DateTime<Utc>) -> SchedulingResult<NaiveDate> {
    Ok(local_now(tz, now)?.date())
}

/// Hours between two local date-times (negative when `end` precedes `start`).
pub fn span_hours(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_minutes() as f64 / 60.0
}

/// serde adapter storing a `NaiveTime` as "HH:MM".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_clock(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

/// serde adapter for `Option<NaiveTime>` stored as "HH:MM".
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_some(&super::format_clock(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            Some(raw) if !raw.trim().is_empty() => super::parse_clock(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clock_pattern_compiles_once_and_is_reused() {
        assert!(CLOCK_RE.is_ok());
        let first: *const Result<Regex, regex::Error> = &*CLOCK_RE;
        for raw in ["07:30", "7:30", "0730"] {
            assert_eq!(format_clock(parse_clock(raw).unwrap()), "07:30");
        }
        assert!(std::ptr::eq(first, &*CLOCK_RE));
    }

    #[test]
    fn parses_clock_variants() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(parse_clock("09:00").unwrap(), nine);
        assert_eq!(parse_clock("9:00").unwrap(), nine);
        assert_eq!(parse_clock("0900").unwrap(), nine);
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("nine").is_err());
    }

    #[test]
    fn end_of_day_is_2359() {
        assert_eq!(format_clock(end_of_day()), "23:59");
        assert_eq!(format_clock(start_of_day()), "00:00");
    }

    #[test]
    fn local_today_follows_timezone() {
        // 03:00 UTC on Jan 4 is still Jan 3 in Chicago (UTC-6).
        let now = Utc.with_ymd_and_hms(2025, 1, 4, 3, 0, 0).unwrap();
        let today = local_today("America/Chicago", now).unwrap();
        assert_eq!(today, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        assert!(local_today("Mars/Olympus", now).is_err());
    }

    #[test]
    fn span_hours_counts_minutes() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let start = d.and_time(parse_clock("08:00").unwrap());
        let end = d.and_time(parse_clock("16:30").unwrap());
        assert_eq!(span_hours(start, end), 8.5);
        assert_eq!(span_hours(end, start), -8.5);
    }
}
