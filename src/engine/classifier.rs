use crate::engine::time::TimeOfDay;
use crate::model::policy::Policy;
use crate::model::status::StatusCode;

/// Derive the attendance status of a single record.
///
/// An admin override always wins. Otherwise a missing punch-in means
/// `Absent`, and a punch-in up to `start_time + grace` means `OnTime`.
/// The punch-out plays no part; `HalfDay` and `OnLeave` only come from
/// overrides.
pub fn classify(
    punch_in: Option<TimeOfDay>,
    _punch_out: Option<TimeOfDay>,
    policy: &Policy,
    override_status: Option<StatusCode>,
) -> StatusCode {
    if let Some(status) = override_status {
        return status;
    }

    let Some(punch_in) = punch_in else {
        return StatusCode::Absent;
    };

    if punch_in <= grace_end(policy) {
        StatusCode::OnTime
    } else {
        StatusCode::Late
    }
}

/// Latest punch-in still counted as on time, clamped to 23:59.
pub fn grace_end(policy: &Policy) -> TimeOfDay {
    policy
        .start_time
        .saturating_add(policy.late_grace_period_minutes)
}
