use crate::engine::time::{PLACEHOLDER, TimeOfDay};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

const MINUTES_PER_DAY: u32 = 1440;

/// Time worked between punch-in and punch-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkedDuration {
    pub hours: u32,
    pub minutes: u32,
}

impl WorkedDuration {
    pub fn from_minutes(total: u32) -> Self {
        WorkedDuration {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(self) -> u32 {
        self.hours * 60 + self.minutes
    }

    /// `H:MM`, the form stored alongside the record.
    pub fn to_clock(self) -> String {
        format!("{}:{:02}", self.hours, self.minutes)
    }

    pub fn decimal_hours(self) -> f64 {
        (f64::from(self.total_minutes()) / 60.0 * 10.0).round() / 10.0
    }

    /// Decimal hours with one decimal place, as shown on attendance rows.
    pub fn to_decimal_string(self) -> String {
        format!("{:.1}", self.decimal_hours())
    }
}

impl fmt::Display for WorkedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_clock())
    }
}

/// Worked time between two punches; a punch-out before the punch-in is an
/// overnight shift. `None` when either punch is missing.
pub fn duration(punch_in: Option<TimeOfDay>, punch_out: Option<TimeOfDay>) -> Option<WorkedDuration> {
    let (start, end) = (punch_in?.minutes(), punch_out?.minutes());
    let worked = (end + MINUTES_PER_DAY - start) % MINUTES_PER_DAY;
    Some(WorkedDuration::from_minutes(worked))
}

/// Resolve the hours worked of a stored record.
///
/// A stored `H:MM` value has already been computed and is kept as-is. Empty
/// values and raw datetimes from the sheet are recomputed from the punches.
pub fn reconcile(
    stored: Option<&str>,
    punch_in: Option<TimeOfDay>,
    punch_out: Option<TimeOfDay>,
) -> Option<WorkedDuration> {
    stored
        .and_then(parse_clock_duration)
        .or_else(|| duration(punch_in, punch_out))
}

/// `H:MM` rendering with the placeholder for a missing duration.
pub fn display(worked: Option<WorkedDuration>) -> String {
    worked
        .map(WorkedDuration::to_clock)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn parse_clock_duration(raw: &str) -> Option<WorkedDuration> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(hours) || hours.len() > 2 || !digits(minutes) || minutes.len() != 2 {
        return None;
    }
    let (hours, minutes): (u32, u32) = (hours.parse().ok()?, minutes.parse().ok()?);
    (minutes < 60).then_some(WorkedDuration { hours, minutes })
}
