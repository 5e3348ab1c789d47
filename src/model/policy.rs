use crate::engine::calendar::{WorkingDays, parse_working_days};
use crate::engine::time::{TimeOfDay, normalize_in};
use chrono::FixedOffset;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_START_TIME: &str = "09:00";
pub const DEFAULT_LATE_GRACE_PERIOD: u32 = 0;
pub const DEFAULT_WORKING_DAYS: &str = "Mon,Tue,Wed,Thu,Fri";

/// Settings as they come from the settings sheet; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    pub start_time: Option<String>,
    pub late_grace_period: Option<String>,
    pub working_days: Option<String>,
}

/// Company attendance policy, resolved from settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub start_time: TimeOfDay,
    pub late_grace_period_minutes: u32,
    pub working_days: WorkingDays,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            start_time: TimeOfDay::from_hm(9, 0).unwrap_or(TimeOfDay::LAST_MINUTE),
            late_grace_period_minutes: DEFAULT_LATE_GRACE_PERIOD,
            working_days: WorkingDays::WEEKDAYS,
        }
    }
}

impl Policy {
    pub fn from_settings(raw: &RawSettings, zone: &FixedOffset) -> Self {
        let defaults = Policy::default();

        let start_time = match raw.start_time.as_deref().map(str::trim) {
            None | Some("") => defaults.start_time,
            Some(value) => normalize_in(Some(value), zone).unwrap_or_else(|| {
                warn!(value, fallback = DEFAULT_START_TIME, "Invalid StartTime setting");
                defaults.start_time
            }),
        };

        let late_grace_period_minutes = match raw.late_grace_period.as_deref().map(str::trim) {
            None | Some("") => defaults.late_grace_period_minutes,
            Some(value) => parse_grace(value).unwrap_or_else(|| {
                warn!(value, "Invalid LateGracePeriod setting, using 0");
                DEFAULT_LATE_GRACE_PERIOD
            }),
        };

        let working_days = parse_working_days(
            raw.working_days
                .as_deref()
                .unwrap_or(DEFAULT_WORKING_DAYS),
        );

        Policy {
            start_time,
            late_grace_period_minutes,
            working_days,
        }
    }
}

/// Whole minutes; sheets sometimes hand back `"10.0"`. Negative values clamp to 0.
fn parse_grace(value: &str) -> Option<u32> {
    if let Ok(minutes) = value.parse::<i64>() {
        return Some(minutes.clamp(0, i64::from(u32::MAX)) as u32);
    }
    let minutes = value.parse::<f64>().ok().filter(|m| m.is_finite())?;
    Some(minutes.max(0.0).min(f64::from(u32::MAX)) as u32)
}
