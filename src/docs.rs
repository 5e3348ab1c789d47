use crate::api::attendance::{AddAttendance, AttendanceDayResponse, EditAttendance};
use crate::api::settings::PolicyResponse;
use crate::engine::calendar::CalendarDay;
use crate::engine::controller::{AttendanceRowView, AttendanceSummary};
use crate::model::attendance::AttendanceEntry;
use crate::model::member::Member;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "0.1.0",
        description = r#"
## Attendance Status & Time Accounting

Derives attendance status and hours worked from punch-in/punch-out times and
the company policy, and serves the per-date attendance view of the HR console.

### 🔹 Key Features
- **Daily view**
  - Summary counts (present, late, absent, on leave) and filtered rows
- **Attendance entry**
  - Single and bulk add, edit with optional status override, delete
- **Calendar**
  - Working days and selectable dates per month
- **Policy**
  - Start time, late grace period and working days with defaults applied

### ⏱ Time formats
Punch times are accepted as `H:MM`, `HH:MM:SS`, `h:MM AM/PM` or ISO-8601
datetimes. Unreadable values are treated as "no punch".

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::get_attendance_day,
        crate::api::attendance::get_eligible_members,
        crate::api::attendance::get_calendar,
        crate::api::attendance::add_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::settings::get_policy,
        crate::api::settings::refresh_policy
    ),
    components(
        schemas(
            AttendanceDayResponse,
            AttendanceSummary,
            AttendanceRowView,
            AddAttendance,
            AttendanceEntry,
            EditAttendance,
            CalendarDay,
            Member,
            PolicyResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance view and entry APIs"),
        (name = "Settings", description = "Attendance policy APIs"),
    )
)]
pub struct ApiDoc;
