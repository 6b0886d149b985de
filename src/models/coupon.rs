use serde::{Deserialize, Deserializer, Serialize};
use mongodb::bson::oid::ObjectId;

fn default_true() -> bool {
    true
}

/// Legacy documents stored `discount` as a string (e.g. "25"); new writes
/// are numeric. Reads tolerate both.
fn discount_from_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Number(f64),
        String(String),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid discount value: {}", s))),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Identity key, stored uppercase-trimmed.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Nominal order amount the discount math is based on, not a caller
    /// supplied order total.
    pub amount: f64,
    /// Percentage in [0, 100].
    #[serde(deserialize_with = "discount_from_string_or_number")]
    pub discount: f64,
    /// Epoch millis; `None` means the coupon never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Legacy single-use marker. Never consulted by redemption, kept so old
    /// documents round-trip.
    #[serde(default)]
    pub is_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<i64>,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default)]
    pub total_discount: f64,
    #[serde(default)]
    pub category: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub amount: Option<f64>,
    /// Accepted as a string for wire compatibility with existing clients,
    /// validated and stored as a numeric percentage.
    pub discount: Option<serde_json::Value>,
    /// ISO-8601, must be strictly in the future.
    pub expires_at: Option<String>,
    pub category: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListCouponsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Reduced projection returned by the usage summary endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponUsage {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub amount: f64,
    pub discount: f64,
    pub usage_count: i64,
    pub total_discount: f64,
}

impl From<&Coupon> for CouponUsage {
    fn from(coupon: &Coupon) -> Self {
        CouponUsage {
            code: coupon.code.clone(),
            name: coupon.name.clone(),
            amount: coupon.amount,
            discount: coupon.discount,
            usage_count: coupon.usage_count,
            total_discount: coupon.total_discount,
        }
    }
}

/// Outcome of applying a coupon once.
#[derive(Debug)]
pub struct RedemptionResult {
    pub coupon: Coupon,
    pub original_amount: f64,
    pub discount_amount: f64,
    pub order_amount_after_discount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_document_defaults() {
        // Old documents may miss usage fields and store discount as a string.
        let doc = serde_json::json!({
            "code": "SAVE25",
            "amount": 1000.0,
            "discount": "25",
            "createdAt": 1_700_000_000_000i64,
            "updatedAt": 1_700_000_000_000i64,
        });
        let coupon: Coupon = serde_json::from_value(doc).unwrap();
        assert!(coupon.active);
        assert!(!coupon.is_used);
        assert_eq!(coupon.discount, 25.0);
        assert_eq!(coupon.usage_count, 0);
        assert_eq!(coupon.total_discount, 0.0);
        assert!(coupon.expires_at.is_none());
        assert!(coupon.category.is_empty());
    }

    #[test]
    fn test_numeric_discount_roundtrip() {
        let doc = serde_json::json!({
            "code": "HALF",
            "amount": 200.0,
            "discount": 50.0,
            "createdAt": 0i64,
            "updatedAt": 0i64,
        });
        let coupon: Coupon = serde_json::from_value(doc).unwrap();
        assert_eq!(coupon.discount, 50.0);

        let out = serde_json::to_value(&coupon).unwrap();
        assert_eq!(out["discount"], 50.0);
        assert_eq!(out["usageCount"], 0);
    }

    #[test]
    fn test_garbage_discount_rejected() {
        let doc = serde_json::json!({
            "code": "BAD",
            "amount": 10.0,
            "discount": "not-a-number",
            "createdAt": 0i64,
            "updatedAt": 0i64,
        });
        assert!(serde_json::from_value::<Coupon>(doc).is_err());
    }
}
