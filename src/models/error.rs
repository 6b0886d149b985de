use serde::Serialize;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Uniform error envelope returned by every failing route.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
    #[serde(rename = "errorDetails", skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorResponse {
            success: false,
            message: message.into(),
            errors: None,
            error_details: None,
        }
    }
}

fn is_production() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v == "production")
        .unwrap_or(false)
}

/// A single field-level validation failure, reported inside the
/// `errors` array of the envelope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),
    /// Well-formed request against a real resource whose state forbids the
    /// operation (inactive or expired coupon).
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    DuplicateError(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] mongodb::error::Error),
    #[error("{0}")]
    MailError(String),
    #[error("{0}")]
    InternalError(String),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::ValidationError(_) | ApiError::InvalidState(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::message(self.to_string()))
            }
            ApiError::NotFound(_) => {
                HttpResponse::NotFound().json(ErrorResponse::message(self.to_string()))
            }
            ApiError::DuplicateError(_) => {
                HttpResponse::Conflict().json(ErrorResponse::message(self.to_string()))
            }
            ApiError::DatabaseError(_) => {
                // Store failures get a generic message; details stay in the
                // logs, and in the response only outside production.
                let mut body = ErrorResponse::message("Server error occurred");
                if !is_production() {
                    body.error_details = Some(self.to_string());
                }
                HttpResponse::InternalServerError().json(body)
            }
            ApiError::MailError(_) | ApiError::InternalError(_) => {
                HttpResponse::InternalServerError().json(ErrorResponse::message(self.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::ValidationError("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::InvalidState("Coupon expired".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (
                ApiError::DuplicateError("exists".into()),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::InternalError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.error_response().status(), expected);
        }
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ErrorResponse::message("Coupon not found")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Coupon not found");
        assert!(body.get("errors").is_none());
    }
}
