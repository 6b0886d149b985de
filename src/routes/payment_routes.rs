use actix_web::web;
use crate::handlers::payment_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/pay", web::post().to(payment_handlers::record_payment));
}
