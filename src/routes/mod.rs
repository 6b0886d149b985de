mod coupon_routes;
mod membership_routes;
mod payment_routes;
mod mail_routes;

pub use coupon_routes::configure as configure_coupon_routes;
pub use membership_routes::configure as configure_membership_routes;
pub use payment_routes::configure as configure_payment_routes;
pub use mail_routes::configure as configure_mail_routes;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    configure_coupon_routes(cfg);
    configure_membership_routes(cfg);
    configure_payment_routes(cfg);
    configure_mail_routes(cfg);
}
