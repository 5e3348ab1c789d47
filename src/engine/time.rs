use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// Rendered in place of a missing time or duration.
pub const PLACEHOLDER: &str = "—";

const MINUTES_PER_DAY: u32 = 1440;

/// A wall-clock time stored as minutes since midnight, always in `0..=1439`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay((MINUTES_PER_DAY - 1) as u16);

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then(|| TimeOfDay(minutes as u16))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    /// Adds minutes without wrapping past midnight.
    pub fn saturating_add(self, minutes: u32) -> Self {
        let total = self.minutes().saturating_add(minutes);
        Self::from_minutes(total).unwrap_or(Self::LAST_MINUTE)
    }
}

/// Canonical `HH:MM` form, the one written back to the store.
impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Normalize a raw time value using the host's local zone for ISO datetimes.
pub fn normalize(raw: Option<&str>) -> Option<TimeOfDay> {
    normalize_in(raw, &Local)
}

/// Normalize a raw time value into minutes since midnight.
///
/// Accepts `H:MM`, `HH:MM`, `HH:MM:SS`, `h:MM AM|PM` and ISO-8601 datetimes.
/// Datetimes carrying an offset are converted into `zone` first; naive ones
/// are read as wall time. Everything else is `None`.
pub fn normalize_in<Tz: TimeZone>(raw: Option<&str>, zone: &Tz) -> Option<TimeOfDay> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = if value.contains('T') {
        parse_datetime(value, zone)
    } else if let Some((clock, pm)) = split_meridiem(value) {
        parse_meridiem(clock, pm)
    } else {
        parse_clock(value)
    };

    if parsed.is_none() {
        debug!(raw = value, "Unrecognized time value, treating as no punch");
    }
    parsed
}

/// 12-hour rendering for the console, e.g. `9:05 AM`.
pub fn to_display(time: Option<TimeOfDay>) -> String {
    match time {
        Some(t) => {
            let suffix = if t.hour() < 12 { "AM" } else { "PM" };
            let hour = match t.hour() % 12 {
                0 => 12,
                h => h,
            };
            format!("{}:{:02} {}", hour, t.minute(), suffix)
        }
        None => PLACEHOLDER.to_string(),
    }
}

fn parse_datetime<Tz: TimeZone>(value: &str, zone: &Tz) -> Option<TimeOfDay> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        let local = dt.with_timezone(zone);
        return TimeOfDay::from_hm(local.hour(), local.minute());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|dt| TimeOfDay::from_hm(dt.hour(), dt.minute()))
}

fn split_meridiem(value: &str) -> Option<(&str, bool)> {
    let cut = value.len().checked_sub(2)?;
    if !value.is_char_boundary(cut) {
        return None;
    }
    let (clock, suffix) = value.split_at(cut);
    let pm = if suffix.eq_ignore_ascii_case("pm") {
        true
    } else if suffix.eq_ignore_ascii_case("am") {
        false
    } else {
        return None;
    };
    Some((clock.trim_end(), pm))
}

fn parse_meridiem(clock: &str, pm: bool) -> Option<TimeOfDay> {
    let time = parse_clock(clock)?;
    let hour = time.hour();
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    TimeOfDay::from_hm(hour, time.minute())
}

fn parse_clock(value: &str) -> Option<TimeOfDay> {
    let mut parts = value.split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    if let Some(seconds) = parts.next() {
        if seconds.len() != 2 || number(seconds)? > 59 {
            return None;
        }
    }
    if parts.next().is_some() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    TimeOfDay::from_hm(number(hours)?, number(minutes)?)
}

fn number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
