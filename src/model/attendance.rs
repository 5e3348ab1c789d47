use crate::engine::classifier::classify;
use crate::engine::duration::{WorkedDuration, duration, reconcile};
use crate::engine::time::{TimeOfDay, normalize_in};
use crate::model::policy::Policy;
use crate::model::status::StatusCode;
use chrono::{FixedOffset, NaiveDate};
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;

/// One member's attendance on one date, with canonical times.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub member_id: String,
    pub punch_in: Option<TimeOfDay>,
    pub punch_out: Option<TimeOfDay>,
    pub status: StatusCode,
    pub hours_worked: Option<WorkedDuration>,
    pub comments: String,
    pub status_override: Option<StatusCode>,
}

impl AttendanceRecord {
    /// Build a record from canonical punches, deriving status and hours.
    pub fn derive(
        date: NaiveDate,
        member_id: String,
        punch_in: Option<TimeOfDay>,
        punch_out: Option<TimeOfDay>,
        status_override: Option<StatusCode>,
        comments: String,
        policy: &Policy,
    ) -> Self {
        AttendanceRecord {
            date,
            member_id,
            punch_in,
            punch_out,
            status: classify(punch_in, punch_out, policy, status_override),
            hours_worked: duration(punch_in, punch_out),
            comments,
            status_override,
        }
    }

    /// Re-run classification against the current policy. Hours are left as loaded.
    pub fn rederive_status(&mut self, policy: &Policy) {
        self.status = classify(self.punch_in, self.punch_out, policy, self.status_override);
    }
}

/// Attendance row as stored in the sheet-backed table; every time column is text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub date: NaiveDate,
    pub member_id: String,
    pub punch_in: Option<String>,
    pub punch_out: Option<String>,
    pub status: Option<String>,
    pub status_override: Option<String>,
    pub hours_worked: Option<String>,
    pub comments: Option<String>,
}

impl AttendanceRow {
    /// Normalize a stored row. Unreadable values degrade to "not recorded".
    pub fn into_record(self, zone: &FixedOffset) -> AttendanceRecord {
        let punch_in = normalize_in(self.punch_in.as_deref(), zone);
        let punch_out = normalize_in(self.punch_out.as_deref(), zone);
        let status_override = stored_status(&self.member_id, self.status_override.as_deref());
        let status = stored_status(&self.member_id, self.status.as_deref())
            .or(status_override)
            .unwrap_or(StatusCode::Absent);

        AttendanceRecord {
            hours_worked: reconcile(self.hours_worked.as_deref(), punch_in, punch_out),
            date: self.date,
            member_id: self.member_id,
            punch_in,
            punch_out,
            status,
            comments: self.comments.unwrap_or_default(),
            status_override,
        }
    }
}

fn stored_status(member_id: &str, raw: Option<&str>) -> Option<StatusCode> {
    StatusCode::parse(raw).unwrap_or_else(|_| {
        warn!(member_id, value = raw, "Unknown stored attendance status ignored");
        None
    })
}

/// One entry of a single or bulk attendance submission.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = "M-001")]
    pub member_id: String,
    #[schema(example = "09:05", nullable = true)]
    pub punch_in: Option<String>,
    #[schema(example = "17:30", nullable = true)]
    pub punch_out: Option<String>,
    /// Admin-set status that replaces the derived one
    #[schema(example = "On Leave", nullable = true)]
    pub status_override: Option<String>,
    #[schema(example = "Client visit", nullable = true)]
    pub comments: Option<String>,
}
