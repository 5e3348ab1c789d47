use crate::api::AppState;
use crate::engine::calendar::month_view;
use crate::engine::controller::{AttendanceRowView, AttendanceSummary, RowFilter};
use crate::engine::error::AttendanceError;
use crate::model::attendance::AttendanceEntry;
use crate::model::member::Member;
use crate::model::status::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    /// Attendance date (YYYY-MM-DD)
    #[param(value_type = String, example = "2025-01-06")]
    pub date: NaiveDate,
    /// Filter by department
    pub department: Option<String>,
    /// Filter by status, e.g. `On Time`, `Late`
    pub status: Option<String>,
    /// Case-insensitive search on member name
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    #[param(value_type = String, example = "2025-01-06")]
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    #[param(example = 2025)]
    pub year: i32,
    #[param(example = 1)]
    pub month: u32,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceDayResponse {
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub working_day: bool,
    pub selectable: bool,
    pub summary: AttendanceSummary,
    pub rows: Vec<AttendanceRowView>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddAttendance {
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    /// One entry for a single add, several for a bulk add
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditAttendance {
    #[schema(example = "09:05", nullable = true)]
    pub punch_in: Option<String>,
    #[schema(example = "17:30", nullable = true)]
    pub punch_out: Option<String>,
    #[schema(example = "On Leave", nullable = true)]
    pub status_override: Option<String>,
    #[schema(nullable = true)]
    pub comments: Option<String>,
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<StatusCode>, AttendanceError> {
    StatusCode::parse(raw).map_err(|_| {
        AttendanceError::Validation(
            "Invalid status filter. Allowed: On Time, Late, Absent, Half Day, On Leave".to_string(),
        )
    })
}

/// Attendance for a date: summary counts and filtered rows
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DayQuery),
    responses(
        (status = 200, description = "Attendance view for the date", body = AttendanceDayResponse),
        (status = 400, description = "Invalid filter"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_attendance_day(
    state: web::Data<AppState>,
    query: web::Query<DayQuery>,
) -> Result<HttpResponse, AttendanceError> {
    let filter = RowFilter {
        department: query.department.clone(),
        status: parse_status_filter(query.status.as_deref())?,
        search: query.search.clone(),
    };

    let session = state.open_session(query.date).await?;
    let rows = session.rows(&filter);
    debug!(date = %query.date, rows = rows.len(), ?filter, "Attendance view built");

    Ok(HttpResponse::Ok().json(AttendanceDayResponse {
        date: session.date(),
        working_day: session.is_working_day(),
        selectable: session.date_selectable(),
        summary: session.summary(),
        rows,
    }))
}

/// Members that can still be given attendance on a date
#[utoipa::path(
    get,
    path = "/api/attendance/eligible",
    params(DateQuery),
    responses(
        (status = 200, description = "Active members without attendance on the date", body = [Member]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_eligible_members(
    state: web::Data<AppState>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AttendanceError> {
    let session = state.open_session(query.date).await?;
    let eligible: Vec<&Member> = session.eligible_members();
    Ok(HttpResponse::Ok().json(eligible))
}

/// Date picker view for a month
#[utoipa::path(
    get,
    path = "/api/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Working-day and selectable flags per day", body = [CalendarDay]),
        (status = 400, description = "Invalid month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_calendar(
    state: web::Data<AppState>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AttendanceError> {
    if !(1..=12).contains(&query.month) {
        return Err(AttendanceError::Validation(
            "month must be between 1 and 12".to_string(),
        ));
    }

    let policy = state
        .policy_cache
        .get_or_load(state.backend.settings.as_ref())
        .await?;
    let days = month_view(query.year, query.month, state.today(), policy.working_days);
    Ok(HttpResponse::Ok().json(days))
}

/// Add attendance for one or many members
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AddAttendance,
    responses(
        (status = 200, description = "Attendance saved", body = Object, example = json!({
            "message": "Attendance saved",
            "saved": 2
        })),
        (status = 400, description = "Non-working or future date, or invalid entries", body = Object, example = json!({
            "message": "2025-01-11 is not a working day"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn add_attendance(
    state: web::Data<AppState>,
    payload: web::Json<AddAttendance>,
) -> Result<HttpResponse, AttendanceError> {
    let mut session = state.open_session(payload.date).await?;
    let saved = session.add(&payload.entries).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance saved",
        "saved": saved
    })))
}

/// Edit a member's attendance on a date
#[utoipa::path(
    put,
    path = "/api/attendance/{date}/{member_id}",
    params(
        ("date" = String, Path, description = "Attendance date (YYYY-MM-DD)"),
        ("member_id" = String, Path, description = "Member ID")
    ),
    request_body = EditAttendance,
    responses(
        (status = 200, description = "Attendance updated", body = Object, example = json!({
            "message": "Attendance updated",
            "status": "Half Day"
        })),
        (status = 404, description = "No attendance for the member on the date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    state: web::Data<AppState>,
    path: web::Path<(NaiveDate, String)>,
    payload: web::Json<EditAttendance>,
) -> Result<HttpResponse, AttendanceError> {
    let (date, member_id) = path.into_inner();
    let payload = payload.into_inner();
    let entry = AttendanceEntry {
        member_id: member_id.clone(),
        punch_in: payload.punch_in,
        punch_out: payload.punch_out,
        status_override: payload.status_override,
        comments: payload.comments,
    };

    let mut session = state.open_session(date).await?;
    let record = session.edit(&member_id, &entry).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance updated",
        "status": record.status
    })))
}

/// Delete a member's attendance on a date
#[utoipa::path(
    delete,
    path = "/api/attendance/{date}/{member_id}",
    params(
        ("date" = String, Path, description = "Attendance date (YYYY-MM-DD)"),
        ("member_id" = String, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "No attendance for the member on the date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    state: web::Data<AppState>,
    path: web::Path<(NaiveDate, String)>,
) -> Result<HttpResponse, AttendanceError> {
    let (date, member_id) = path.into_inner();

    let mut session = state.open_session(date).await?;
    session.delete(&member_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
