use crate::{
    api::{attendance, employee, schedule, summary},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance/scan — the kiosk endpoint, rate limited on its own
                    .service(
                        web::resource("/scan")
                            .wrap(build_limiter(config.rate_scan_per_min))
                            .route(web::post().to(attendance::scan)),
                    )
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(build_limiter(config.rate_admin_per_min))
                            .route(web::get().to(attendance::list_today)),
                    )
                    // /attendance/history
                    .service(
                        web::resource("/history")
                            .wrap(build_limiter(config.rate_admin_per_min))
                            .route(web::get().to(attendance::history)),
                    )
                    // /attendance/events — live SSE stream
                    .service(
                        web::resource("/events")
                            .wrap(build_limiter(config.rate_admin_per_min))
                            .route(web::get().to(attendance::events)),
                    )
                    // /attendance/summaries
                    .service(
                        web::resource("/summaries")
                            .wrap(build_limiter(config.rate_admin_per_min))
                            .route(web::get().to(summary::list_for_date)),
                    )
                    .service(
                        web::resource("/summaries/monthly")
                            .wrap(build_limiter(config.rate_admin_per_min))
                            .route(web::get().to(summary::monthly)),
                    )
                    .service(
                        web::resource("/summaries/{id}")
                            .wrap(build_limiter(config.rate_admin_per_min))
                            .route(web::put().to(summary::manual_edit)),
                    ),
            )
            .service(
                web::scope("/schedule")
                    .wrap(build_limiter(config.rate_admin_per_min))
                    // /schedule
                    .service(
                        web::resource("")
                            .route(web::get().to(schedule::list_schedules))
                            .route(web::post().to(schedule::create_schedule)),
                    )
                    // /schedule/{id}/activate
                    .service(
                        web::resource("/{id}/activate")
                            .route(web::put().to(schedule::activate_schedule)),
                    )
                    // /schedule/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(schedule::update_schedule))
                            .route(web::delete().to(schedule::delete_schedule)),
                    ),
            )
            .service(
                web::scope("/employee")
                    .wrap(build_limiter(config.rate_admin_per_min))
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            ),
    );
}
