use actix_web::{web, HttpResponse, ResponseError};
use chrono::Utc;
use log::{error, info};
use serde_json::json;

use crate::models::{Payment, PaymentMethod, RecordPaymentRequest};
use crate::services::MongoDBService;

/// Record a payment transaction. This is a log write, not a gateway charge.
pub async fn record_payment(
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<RecordPaymentRequest>,
) -> HttpResponse {
    let method = match payload.validate() {
        Ok(method) => method,
        Err(errors) => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors,
            }));
        }
    };

    let payment = Payment {
        id: None,
        method,
        amount: payload.amount.unwrap_or_default(),
        card: match method {
            PaymentMethod::Card => payload.card.clone(),
            PaymentMethod::Upi => None,
        },
        upi: match method {
            PaymentMethod::Upi => payload.upi.clone(),
            PaymentMethod::Card => None,
        },
        created_at: Utc::now().timestamp_millis(),
    };

    match mongodb.create_payment(payment).await {
        Ok(payment) => {
            info!("Recorded {:?} payment of {}", payment.method, payment.amount);
            HttpResponse::Created().json(json!({
                "success": true,
                "message": "Payment successful",
                "payment": payment,
            }))
        }
        Err(e) => {
            error!("Payment error: {}", e);
            e.error_response()
        }
    }
}
