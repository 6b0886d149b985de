use actix_web::{web, HttpResponse, ResponseError};
use chrono::Utc;
use log::{error, info};
use serde_json::json;

use crate::models::{CheckDuplicateRequest, FieldError, Member, RegisterMemberRequest};
use crate::services::MongoDBService;
use crate::utils::validators::{
    is_valid_email, is_valid_whatsapp, normalize_email, normalize_whatsapp,
};

/// Probe both identity fields for existing use. Not fail-fast: the client
/// gets every conflict in one response.
pub async fn check_duplicate(
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<CheckDuplicateRequest>,
) -> HttpResponse {
    let email = normalize_email(payload.email.as_deref().unwrap_or_default());
    let whatsapp = normalize_whatsapp(payload.whatsapp.as_deref().unwrap_or_default());

    match mongodb.member_duplicates(&email, &whatsapp).await {
        Ok((email_taken, whatsapp_taken)) => {
            let mut errors = serde_json::Map::new();
            if email_taken {
                errors.insert("email".to_string(), json!("Email already used."));
            }
            if whatsapp_taken {
                errors.insert("whatsapp".to_string(), json!("WhatsApp already used."));
            }

            if !errors.is_empty() {
                return HttpResponse::Conflict().json(json!({
                    "success": false,
                    "message": "Member details already in use",
                    "errors": errors,
                }));
            }
            HttpResponse::Ok().json(json!({ "success": true }))
        }
        Err(e) => {
            error!(
                "Error checking duplicate member (email={}, whatsapp={}): {}",
                email, whatsapp, e
            );
            e.error_response()
        }
    }
}

/// Register a new member
pub async fn register_member(
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<RegisterMemberRequest>,
) -> HttpResponse {
    let mut errors = Vec::new();

    let email = normalize_email(payload.email.as_deref().unwrap_or_default());
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }

    let whatsapp = normalize_whatsapp(payload.whatsapp.as_deref().unwrap_or_default());
    if whatsapp.is_empty() {
        errors.push(FieldError::new("whatsapp", "WhatsApp number is required"));
    } else if !is_valid_whatsapp(&whatsapp) {
        errors.push(FieldError::new("whatsapp", "Invalid WhatsApp number"));
    }

    if !errors.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Validation failed",
            "errors": errors,
        }));
    }

    let now = Utc::now().timestamp_millis();
    let member = Member {
        id: None,
        name: payload.name.clone(),
        company_name: payload.company_name.clone(),
        linkedin: payload.linkedin.clone(),
        website: payload.website.clone(),
        city: payload.city.clone(),
        email,
        whatsapp,
        coupon_code: payload.coupon_code.clone(),
        payment_amount: payload.payment_amount,
        created_at: now,
        updated_at: now,
    };

    match mongodb.create_member(member).await {
        Ok(member) => {
            info!("Registered member {}", member.email);
            HttpResponse::Created().json(json!({
                "success": true,
                "message": "Member registered successfully",
                "member": member,
            }))
        }
        Err(e) => {
            error!("Error registering member: {}", e);
            e.error_response()
        }
    }
}
