use serde::{Deserialize, Serialize};
use mongodb::bson::oid::ObjectId;

/// Order records written by external tooling. No route in this service
/// reads or writes them; `coupon_code` is an advisory string, not an
/// enforced reference.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub discount_amount: f64,
    pub created_at: i64,
}
