use actix_web::web;
use crate::handlers::mail_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/send-mail", web::post().to(mail_handlers::send_mail));
}
