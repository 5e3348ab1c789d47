use crate::api::AppState;
use crate::engine::classifier::grace_end;
use crate::engine::error::AttendanceError;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "start_time": "09:00",
    "late_grace_period_minutes": 10,
    "on_time_until": "09:10",
    "working_days": ["Mon", "Tue", "Wed", "Thu", "Fri"]
}))]
pub struct PolicyResponse {
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = 10)]
    pub late_grace_period_minutes: u32,
    /// Latest punch-in still counted as on time
    #[schema(example = "09:10")]
    pub on_time_until: String,
    #[schema(example = json!(["Mon", "Tue", "Wed", "Thu", "Fri"]))]
    pub working_days: Vec<String>,
}

/// Effective attendance policy after defaults
#[utoipa::path(
    get,
    path = "/api/settings/policy",
    responses(
        (status = 200, description = "Resolved policy", body = PolicyResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Settings"
)]
pub async fn get_policy(state: web::Data<AppState>) -> Result<HttpResponse, AttendanceError> {
    let policy = state
        .policy_cache
        .get_or_load(state.backend.settings.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(PolicyResponse {
        start_time: policy.start_time.to_string(),
        late_grace_period_minutes: policy.late_grace_period_minutes,
        on_time_until: grace_end(&policy).to_string(),
        working_days: policy.working_days.iter().map(|d| d.to_string()).collect(),
    }))
}

/// Drop the cached policy so the next request rereads the settings sheet
#[utoipa::path(
    post,
    path = "/api/settings/policy/refresh",
    responses(
        (status = 200, description = "Policy cache cleared", body = Object, example = json!({
            "message": "Policy reloaded"
        }))
    ),
    tag = "Settings"
)]
pub async fn refresh_policy(state: web::Data<AppState>) -> HttpResponse {
    state.policy_cache.invalidate().await;
    info!("Policy cache invalidated");
    HttpResponse::Ok().json(json!({
        "message": "Policy reloaded"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::policy::RawSettings;
    use crate::routes;
    use crate::store::Backend;
    use crate::store::memory::MemoryStore;
    use crate::utils::policy_cache::PolicyCache;
    use actix_web::{App, test};
    use chrono::FixedOffset;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    #[actix_web::test]
    async fn reports_policy_with_defaults_filled_in() {
        let store = Arc::new(MemoryStore::new(
            Vec::new(),
            RawSettings {
                late_grace_period: Some("15".into()),
                working_days: Some("sun;mon;tue;wed;thu".into()),
                ..Default::default()
            },
        ));
        let zone = FixedOffset::east_opt(0).unwrap();
        let state = AppState {
            backend: Backend::from_shared(store),
            policy_cache: PolicyCache::new(Duration::from_secs(60), zone),
            zone,
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api").configure(routes::api_services)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/settings/policy").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["start_time"], "09:00");
        assert_eq!(body["late_grace_period_minutes"], 15);
        assert_eq!(body["on_time_until"], "09:15");
        assert_eq!(body["working_days"], json!(["Mon", "Tue", "Wed", "Thu", "Sun"]));

        let req = test::TestRequest::post()
            .uri("/api/settings/policy/refresh")
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
}
