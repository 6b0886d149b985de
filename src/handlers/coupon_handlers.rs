use actix_web::{web, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde_json::json;

use crate::models::{Coupon, CreateCouponRequest, FieldError, ListCouponsQuery};
use crate::services::MongoDBService;
use crate::utils::discount::normalize_code;

fn validation_failed(errors: Vec<FieldError>) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "message": "Validation failed",
        "errors": errors,
    }))
}

/// Create a new coupon
pub async fn create_coupon(
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<CreateCouponRequest>,
) -> HttpResponse {
    let mut errors = Vec::new();

    let code = payload
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if code.is_none() {
        errors.push(FieldError::new("code", "Code is required"));
    }

    let amount = match payload.amount {
        Some(a) if a > 0.0 => Some(a),
        Some(_) => {
            errors.push(FieldError::new("amount", "Amount must be greater than 0"));
            None
        }
        None => {
            errors.push(FieldError::new("amount", "Amount is required"));
            None
        }
    };

    // Existing clients send the percentage as a string; accept numbers too,
    // store numeric either way.
    let discount = match payload.discount.as_ref() {
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        _ => None,
    };
    match discount {
        Some(d) if (0.0..=100.0).contains(&d) => {}
        Some(_) => errors.push(FieldError::new(
            "discount",
            "Discount must be a percentage between 0 and 100",
        )),
        None => errors.push(FieldError::new(
            "discount",
            "Discount is required and must be numeric",
        )),
    }

    let expires_at = match payload.expires_at.as_deref() {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.timestamp_millis()),
            Err(_) => {
                errors.push(FieldError::new("expiresAt", "Must be a valid ISO-8601 date"));
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return validation_failed(errors);
    }

    let now = Utc::now().timestamp_millis();
    if let Some(expiry) = expires_at {
        if expiry <= now {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Expiry date must be in the future",
            }));
        }
    }

    let coupon = Coupon {
        id: None,
        code: normalize_code(code.unwrap_or_default()),
        name: payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        active: true,
        amount: amount.unwrap_or_default(),
        discount: discount.unwrap_or_default(),
        expires_at,
        is_used: false,
        used_at: None,
        usage_count: 0,
        total_discount: 0.0,
        category: payload.category.clone().unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    match mongodb.create_coupon(coupon).await {
        Ok(coupon) => {
            info!("Created coupon {}", coupon.code);
            HttpResponse::Created().json(json!({
                "success": true,
                "message": "Coupon created successfully",
                "coupon": coupon,
            }))
        }
        Err(e) => {
            error!("Coupon creation error: {}", e);
            e.error_response()
        }
    }
}

/// List coupons, newest first, with a total independent of the page window
pub async fn get_coupons(
    mongodb: web::Data<MongoDBService>,
    query: web::Query<ListCouponsQuery>,
) -> HttpResponse {
    let page = query
        .page
        .as_deref()
        .and_then(|p| p.parse::<u64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let limit = query
        .limit
        .as_deref()
        .and_then(|l| l.parse::<i64>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(100);

    match mongodb.list_coupons(page, limit).await {
        Ok((coupons, total)) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": coupons.len(),
            "total": total,
            "coupons": coupons,
        })),
        Err(e) => {
            error!("Fetch error: {}", e);
            e.error_response()
        }
    }
}

/// Usage summary across all coupons, backfilling missing counters
pub async fn usage_summary(mongodb: web::Data<MongoDBService>) -> HttpResponse {
    match mongodb.coupon_usage().await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            error!("Error building coupon usage summary: {}", e);
            e.error_response()
        }
    }
}

/// Validate a coupon and project the discount it would grant
pub async fn validate_coupon(
    mongodb: web::Data<MongoDBService>,
    code: web::Path<String>,
) -> HttpResponse {
    match mongodb.validate_coupon(&code).await {
        Ok((coupon, breakdown)) => HttpResponse::Ok().json(json!({
            "valid": true,
            "coupon": coupon,
            "discountAmount": breakdown.discount_amount,
        })),
        Err(e) => {
            error!("Validation error for code {}: {}", code, e);
            e.error_response()
        }
    }
}

/// Redeem a coupon once
pub async fn use_coupon(
    mongodb: web::Data<MongoDBService>,
    code: web::Path<String>,
) -> HttpResponse {
    match mongodb.redeem_coupon(&code).await {
        Ok(result) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon applied successfully",
            "coupon": result.coupon,
            "originalAmount": result.original_amount,
            "discountAmount": result.discount_amount,
            "orderAmountAfterDiscount": result.order_amount_after_discount,
        })),
        Err(e) => {
            error!("Use error for code {}: {}", code, e);
            e.error_response()
        }
    }
}

/// Flip a coupon's active flag
pub async fn toggle_coupon(mongodb: web::Data<MongoDBService>, id: web::Path<String>) -> HttpResponse {
    match mongodb.toggle_coupon(&id).await {
        Ok(coupon) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!(
                "Coupon {} successfully",
                if coupon.active { "activated" } else { "deactivated" }
            ),
            "coupon": coupon,
        })),
        Err(e) => {
            error!("Toggle error for id {}: {}", id, e);
            e.error_response()
        }
    }
}

/// Delete a coupon by id
pub async fn delete_coupon(mongodb: web::Data<MongoDBService>, id: web::Path<String>) -> HttpResponse {
    match mongodb.delete_coupon(&id).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon deleted successfully",
        })),
        Err(e) => {
            error!("Delete error for id {}: {}", id, e);
            e.error_response()
        }
    }
}
