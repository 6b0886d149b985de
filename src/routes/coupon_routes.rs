use actix_web::web;
use crate::handlers::coupon_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/coupons")
            .route("/create", web::post().to(coupon_handlers::create_coupon))
            .route("", web::get().to(coupon_handlers::get_coupons))
            .route("/usage", web::get().to(coupon_handlers::usage_summary))
            .route(
                "/validate/{code}",
                web::get().to(coupon_handlers::validate_coupon),
            )
            .route("/use/{code}", web::post().to(coupon_handlers::use_coupon))
            .route("/toggle/{id}", web::put().to(coupon_handlers::toggle_coupon))
            .route("/{id}", web::delete().to(coupon_handlers::delete_coupon)),
    );
}
