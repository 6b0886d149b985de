use actix_web::{web, HttpResponse, ResponseError};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

use crate::services::MailService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    pub name: String,
    pub email: String,
    pub coupon_code: String,
    pub payment_amount: f64,
}

/// Send the welcome email after a successful registration
pub async fn send_mail(
    mail: web::Data<MailService>,
    payload: web::Json<SendMailRequest>,
) -> HttpResponse {
    match mail
        .send_welcome_email(
            &payload.name,
            &payload.email,
            &payload.coupon_code,
            payload.payment_amount,
        )
        .await
    {
        Ok(()) => {
            info!("Welcome email sent to {}", payload.email);
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Email sent successfully",
            }))
        }
        Err(e) => {
            error!("Email send error for {}: {}", payload.email, e);
            e.error_response()
        }
    }
}
