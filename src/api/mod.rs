pub mod attendance;
pub mod settings;

use crate::engine::controller::{AttendanceViewController, SessionSnapshot};
use crate::engine::error::AttendanceError;
use crate::store::Backend;
use crate::utils::policy_cache::PolicyCache;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::{FixedOffset, NaiveDate, Utc};
use serde_json::json;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub policy_cache: PolicyCache,
    pub zone: FixedOffset,
}

impl AppState {
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }

    /// Load roster, policy and the date's records into a fresh view session.
    pub async fn open_session(&self, date: NaiveDate) -> Result<AttendanceViewController, AttendanceError> {
        let (roster, policy) = futures::try_join!(
            self.backend.members.members(),
            self.policy_cache.get_or_load(self.backend.settings.as_ref()),
        )?;

        let snapshot = SessionSnapshot {
            roster,
            policy,
            today: self.today(),
            zone: self.zone,
        };
        AttendanceViewController::open(self.backend.attendance.clone(), snapshot, date).await
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Validation(_) | AttendanceError::PolicyViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Persistence(e) => {
                tracing::error!(error = %e, "Attendance store call failed");
                "Something went wrong, Contact with system admin".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
