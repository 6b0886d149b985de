use serde::{Deserialize, Serialize};
use mongodb::bson::oid::ObjectId;

use crate::models::FieldError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpiDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

/// Write-once payment record. Card details are persisted verbatim, raw CVV
/// included, to match the shape existing consumers read back. There is no
/// tokenization; see DESIGN.md for the flagged security gap.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub method: PaymentMethod,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi: Option<UpiDetails>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub method: Option<String>,
    pub amount: Option<f64>,
    pub card: Option<CardDetails>,
    pub upi: Option<UpiDetails>,
}

impl RecordPaymentRequest {
    /// Conditional required-field validation keyed on `method`.
    pub fn validate(&self) -> Result<PaymentMethod, Vec<FieldError>> {
        let mut errors = Vec::new();

        let method = match self.method.as_deref() {
            Some("card") => Some(PaymentMethod::Card),
            Some("upi") => Some(PaymentMethod::Upi),
            _ => {
                errors.push(FieldError::new("method", "Must be one of: card, upi"));
                None
            }
        };

        if self.amount.is_none() {
            errors.push(FieldError::new("amount", "Amount is required"));
        }

        match method {
            Some(PaymentMethod::Card) => {
                let card = self.card.as_ref();
                if card
                    .and_then(|c| c.card_name.as_deref())
                    .map_or(true, |v| v.trim().is_empty())
                {
                    errors.push(FieldError::new("card.cardName", "Cardholder name is required"));
                }
                if card
                    .and_then(|c| c.card_number.as_deref())
                    .map_or(true, |v| v.len() < 12)
                {
                    errors.push(FieldError::new(
                        "card.cardNumber",
                        "Card number must be at least 12 characters",
                    ));
                }
                if card
                    .and_then(|c| c.expiry.as_deref())
                    .map_or(true, |v| v.trim().is_empty())
                {
                    errors.push(FieldError::new("card.expiry", "Expiry is required"));
                }
                if card
                    .and_then(|c| c.cvv.as_deref())
                    .map_or(true, |v| v.len() < 3)
                {
                    errors.push(FieldError::new("card.cvv", "CVV must be at least 3 characters"));
                }
            }
            Some(PaymentMethod::Upi) => {
                if self
                    .upi
                    .as_ref()
                    .and_then(|u| u.upi_id.as_deref())
                    .map_or(true, |v| v.trim().is_empty())
                {
                    errors.push(FieldError::new("upi.upiId", "UPI ID is required"));
                }
            }
            None => {}
        }

        match method {
            Some(m) if errors.is_empty() => Ok(m),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_request() -> RecordPaymentRequest {
        RecordPaymentRequest {
            method: Some("card".to_string()),
            amount: Some(499.0),
            card: Some(CardDetails {
                card_name: Some("A Customer".to_string()),
                card_number: Some("4111111111111111".to_string()),
                expiry: Some("12/27".to_string()),
                cvv: Some("123".to_string()),
            }),
            upi: None,
        }
    }

    #[test]
    fn test_valid_card_payment() {
        assert_eq!(card_request().validate().unwrap(), PaymentMethod::Card);
    }

    #[test]
    fn test_card_fields_required_for_card_method() {
        let mut req = card_request();
        req.card = None;
        let errors = req.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"card.cardName"));
        assert!(fields.contains(&"card.cardNumber"));
        assert!(fields.contains(&"card.expiry"));
        assert!(fields.contains(&"card.cvv"));
    }

    #[test]
    fn test_short_card_number_rejected() {
        let mut req = card_request();
        req.card.as_mut().unwrap().card_number = Some("41111111".to_string());
        let errors = req.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "card.cardNumber"));
    }

    #[test]
    fn test_upi_requires_upi_id_only() {
        let req = RecordPaymentRequest {
            method: Some("upi".to_string()),
            amount: Some(150.0),
            card: None,
            upi: Some(UpiDetails {
                app: Some("gpay".to_string()),
                upi_id: Some("someone@bank".to_string()),
            }),
        };
        assert_eq!(req.validate().unwrap(), PaymentMethod::Upi);

        let missing = RecordPaymentRequest {
            method: Some("upi".to_string()),
            amount: Some(150.0),
            card: None,
            upi: None,
        };
        let errors = missing.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "upi.upiId");
    }

    #[test]
    fn test_unknown_method_and_missing_amount() {
        let req = RecordPaymentRequest {
            method: Some("cash".to_string()),
            amount: None,
            card: None,
            upi: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "method"));
        assert!(errors.iter().any(|e| e.field == "amount"));
    }

    #[test]
    fn test_method_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::Card).unwrap(),
            serde_json::json!("card")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::Upi).unwrap(),
            serde_json::json!("upi")
        );
    }
}
