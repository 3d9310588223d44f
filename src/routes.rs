use crate::{
    api::{attendance, notifications, profile},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    // both values are non-zero, so `finish` always yields a config
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let limiter = build_limiter(config.rate_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(limiter)
            .service(
                web::scope("/attendance/board")
                    // static segments first so they don't fall into /{employee_id}
                    .service(web::resource("").route(web::get().to(attendance::get_board)))
                    .service(web::resource("/load").route(web::post().to(attendance::load_day)))
                    .service(
                        web::resource("/bulk").route(web::post().to(attendance::bulk_set_status)),
                    )
                    .service(web::resource("/save").route(web::post().to(attendance::save_all)))
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::put().to(attendance::set_status)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("").route(web::get().to(notifications::list_notifications)),
                    )
                    .service(
                        web::resource("/unread-count")
                            .route(web::get().to(notifications::unread_count)),
                    )
                    .service(
                        web::resource("/read-all")
                            .route(web::post().to(notifications::mark_all_read)),
                    )
                    .service(
                        web::resource("/{id}/read").route(web::post().to(notifications::mark_read)),
                    ),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile)),
            ),
    );
}
