use crate::{
    api::{attendance, settings},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-scope limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms.max(1))
            .burst_size(requests_per_min.max(1))
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap_or_else(GovernorConfig::default);
        Governor::new(&cfg)
    }

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .configure(api_services),
    );
}

/// Attendance and settings resources, mounted under the API prefix.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::get().to(attendance::get_attendance_day))
                    .route(web::post().to(attendance::add_attendance)),
            )
            // /attendance/eligible
            .service(
                web::resource("/eligible").route(web::get().to(attendance::get_eligible_members)),
            )
            // /attendance/calendar
            .service(web::resource("/calendar").route(web::get().to(attendance::get_calendar)))
            // /attendance/{date}/{member_id}
            .service(
                web::resource("/{date}/{member_id}")
                    .route(web::put().to(attendance::update_attendance))
                    .route(web::delete().to(attendance::delete_attendance)),
            ),
    )
    .service(
        web::scope("/settings")
            .service(web::resource("/policy").route(web::get().to(settings::get_policy)))
            .service(
                web::resource("/policy/refresh").route(web::post().to(settings::refresh_policy)),
            ),
    );
}
