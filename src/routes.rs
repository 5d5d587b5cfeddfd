use crate::{
    api::{attendance, employee, response::json_error_handler},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use tracing::warn;

// Per-IP limiter over the whole API scope; `None` when disabled or unbuildable.
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    if requests_per_min == 0 {
        return None;
    }
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    match GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
    {
        Some(cfg) => Some(Governor::new(&cfg)),
        None => {
            warn!(requests_per_min, "Rate limiter config rejected, running without it");
            None
        }
    }
}

fn resources(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            // /employees/{reference}
            .service(
                web::resource("/{reference}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::get().to(attendance::list_attendance))
                    .route(web::post().to(attendance::mark_attendance)),
            )
            // /attendance/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(attendance::get_attendance))
                    .route(web::delete().to(attendance::delete_attendance)),
            ),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));

    let scope = web::scope(&config.api_prefix).configure(resources);
    match build_limiter(config.rate_api_per_min) {
        Some(limiter) => cfg.service(scope.wrap(limiter)),
        None => cfg.service(scope),
    };
}
