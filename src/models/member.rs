use serde::{Deserialize, Serialize};
use mongodb::bson::oid::ObjectId;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Stored lowercase-trimmed.
    pub email: String,
    /// Stored trimmed, digits only (10-15).
    pub whatsapp: String,
    /// Advisory reference to a coupon redemption, not validated against the
    /// coupons collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberRequest {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub coupon_code: Option<String>,
    pub payment_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CheckDuplicateRequest {
    pub email: Option<String>,
    pub whatsapp: Option<String>,
}
