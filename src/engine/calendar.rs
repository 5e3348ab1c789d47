use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};
use utoipa::ToSchema;

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays on which attendance may be recorded. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingDays(u8);

impl WorkingDays {
    pub const WEEKDAYS: WorkingDays = WorkingDays(0b0001_1111);

    /// Builds the set, substituting Mon–Fri when `days` is empty.
    pub fn from_days<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mask = days
            .into_iter()
            .fold(0u8, |mask, day| mask | bit(day));
        if mask == 0 {
            Self::WEEKDAYS
        } else {
            WorkingDays(mask)
        }
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        ALL_DAYS.into_iter().filter(move |day| self.contains(*day))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

impl Default for WorkingDays {
    fn default() -> Self {
        Self::WEEKDAYS
    }
}

impl fmt::Display for WorkingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|day| day.to_string()).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for WorkingDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|day| day.to_string()))
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    match token.to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parses the `WorkingDays` setting, e.g. `"Mon|Wed|Fri"` or `"monday, tuesday"`.
///
/// Unknown tokens are dropped. An empty result falls back to Mon–Fri so that
/// date selection is never fully disabled.
pub fn parse_working_days(raw: &str) -> WorkingDays {
    let tokens = raw
        .split(|c: char| matches!(c, '|' | ',' | ';') || c.is_whitespace())
        .filter(|token| !token.is_empty());

    let mut days = Vec::new();
    for token in tokens {
        match parse_weekday(token) {
            Some(day) => days.push(day),
            None => debug!(token, "Ignoring unknown working-day token"),
        }
    }

    if days.is_empty() {
        warn!(raw, "No working days recognized, using Mon-Fri");
    }
    WorkingDays::from_days(days)
}

pub fn is_working_day(date: NaiveDate, days: WorkingDays) -> bool {
    days.contains(date.weekday())
}

/// Attendance can only be entered on working days up to and including today.
pub fn is_selectable(date: NaiveDate, today: NaiveDate, days: WorkingDays) -> bool {
    is_working_day(date, days) && date <= today
}

/// One cell of the date picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CalendarDay {
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Mon")]
    pub weekday: String,
    pub working_day: bool,
    pub selectable: bool,
}

/// Every day of `year`/`month` with its picker flags. Empty for an invalid month.
pub fn month_view(year: i32, month: u32, today: NaiveDate, days: WorkingDays) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| CalendarDay {
            date,
            weekday: date.weekday().to_string(),
            working_day: is_working_day(date, days),
            selectable: is_selectable(date, today, days),
        })
        .collect()
}
