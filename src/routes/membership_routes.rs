use actix_web::web;
use crate::handlers::membership_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/membership")
            .route(
                "/check-duplicate",
                web::post().to(membership_handlers::check_duplicate),
            )
            .route(
                "/register",
                web::post().to(membership_handlers::register_member),
            ),
    );
}
