use mongodb::{Client, Collection, Database};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument, ServerApi,
    ServerApiVersion,
};
use mongodb::IndexModel;
use futures_util::TryStreamExt;
use chrono::Utc;

use crate::models::{
    ApiError, Coupon, CouponUsage, Member, Order, Payment, RedemptionResult,
};
use crate::utils::discount::{
    compute_discount, normalize_code, redemption_gate, DiscountBreakdown, GateFailure,
};

/// Saturating page arithmetic: absurd page numbers land past the last
/// document instead of overflowing.
fn page_skip(page: u64, limit: i64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit as u64)
}

fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11000
    )
}

#[derive(Clone)]
pub struct MongoDBService {
    db: Database,
    coupons: Collection<Coupon>,
    members: Collection<Member>,
    #[allow(dead_code)]
    orders: Collection<Order>,
    payments: Collection<Payment>,
}

impl MongoDBService {
    pub async fn init(uri: &str) -> Result<Self, mongodb::error::Error> {
        // Parse options and configure client
        let mut client_options = ClientOptions::parse(uri).await?;

        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        client_options.server_api = Some(server_api);

        client_options.connect_timeout = Some(std::time::Duration::from_secs(10));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Test connection
        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;

        log::info!("Successfully connected to MongoDB");

        let db = client.database("coupon_api");
        let coupons = db.collection::<Coupon>("coupons");
        let members = db.collection::<Member>("members");
        let orders = db.collection::<Order>("orders");
        let payments = db.collection::<Payment>("payments");

        // Unique index on coupon code; the pre-insert lookup gives friendly
        // errors, the index closes the check-then-insert race.
        let code_options = IndexOptions::builder().unique(true).build();
        let code_model = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(code_options)
            .build();
        coupons.create_index(code_model, None).await?;

        // Unique indexes on the member identity fields
        let email_options = IndexOptions::builder().unique(true).build();
        let email_model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(email_options)
            .build();
        members.create_index(email_model, None).await?;

        let whatsapp_options = IndexOptions::builder().unique(true).build();
        let whatsapp_model = IndexModel::builder()
            .keys(doc! { "whatsapp": 1 })
            .options(whatsapp_options)
            .build();
        members.create_index(whatsapp_model, None).await?;

        Ok(Self {
            db,
            coupons,
            members,
            orders,
            payments,
        })
    }

    /// Liveness probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        self.db.run_command(doc! {"ping": 1}, None).await.is_ok()
    }

    // Coupon methods

    pub async fn create_coupon(&self, mut coupon: Coupon) -> Result<Coupon, ApiError> {
        if let Some(_existing) = self
            .coupons
            .find_one(doc! { "code": &coupon.code }, None)
            .await
            .map_err(ApiError::DatabaseError)?
        {
            return Err(ApiError::DuplicateError(
                "Coupon with this code already exists".to_string(),
            ));
        }

        let result = self
            .coupons
            .insert_one(&coupon, None)
            .await
            .map_err(|e| {
                if is_duplicate_key_error(&e) {
                    ApiError::DuplicateError("Coupon with this code already exists".to_string())
                } else {
                    ApiError::DatabaseError(e)
                }
            })?;

        coupon.id = result.inserted_id.as_object_id();
        Ok(coupon)
    }

    pub async fn list_coupons(&self, page: u64, limit: i64) -> Result<(Vec<Coupon>, u64), ApiError> {
        let skip = page_skip(page, limit);
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let coupons: Vec<Coupon> = self
            .coupons
            .find(None, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)?;

        let total = self
            .coupons
            .count_documents(None, None)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok((coupons, total))
    }

    /// Backfill `usageCount`/`totalDiscount` on documents created before
    /// usage accounting existed, then return the reduced projection.
    /// Idempotent: once backfilled the update matches nothing.
    pub async fn coupon_usage(&self) -> Result<Vec<CouponUsage>, ApiError> {
        let fixed = self
            .coupons
            .update_many(
                doc! {
                    "$or": [
                        { "usageCount": { "$exists": false } },
                        { "totalDiscount": { "$exists": false } },
                    ]
                },
                doc! { "$set": { "usageCount": 0, "totalDiscount": 0.0 } },
                None,
            )
            .await
            .map_err(ApiError::DatabaseError)?;

        if fixed.modified_count > 0 {
            log::info!("Backfilled usage fields on {} coupons", fixed.modified_count);
        }

        let coupons: Vec<Coupon> = self
            .coupons
            .find(None, None)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(coupons.iter().map(CouponUsage::from).collect())
    }

    /// Lookup plus state gates shared by validate and redeem. Gate order:
    /// not found, then expired, then inactive.
    async fn find_redeemable(&self, code: &str) -> Result<Coupon, ApiError> {
        let code = normalize_code(code);
        let coupon = self
            .coupons
            .find_one(doc! { "code": &code }, None)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;

        match redemption_gate(coupon.active, coupon.expires_at, Utc::now().timestamp_millis()) {
            Err(GateFailure::Expired) => {
                Err(ApiError::InvalidState("Coupon expired".to_string()))
            }
            Err(GateFailure::Inactive) => {
                Err(ApiError::InvalidState("Coupon is inactive".to_string()))
            }
            Ok(()) => Ok(coupon),
        }
    }

    /// Validation is a pure projection of the redemption outcome; nothing
    /// is mutated.
    pub async fn validate_coupon(
        &self,
        code: &str,
    ) -> Result<(Coupon, DiscountBreakdown), ApiError> {
        let coupon = self.find_redeemable(code).await?;
        let breakdown = compute_discount(coupon.amount, coupon.discount);
        Ok((coupon, breakdown))
    }

    pub async fn redeem_coupon(&self, code: &str) -> Result<RedemptionResult, ApiError> {
        let coupon = self.find_redeemable(code).await?;
        let breakdown = compute_discount(coupon.amount, coupon.discount);

        // Atomic counters: concurrent redemptions of the same code never
        // lose an increment.
        let now = Utc::now().timestamp_millis();
        let updated = self
            .coupons
            .find_one_and_update(
                doc! { "code": &coupon.code },
                doc! {
                    "$inc": { "usageCount": 1, "totalDiscount": breakdown.discount_amount },
                    "$set": { "usedAt": now, "updatedAt": now },
                },
                Some(
                    FindOneAndUpdateOptions::builder()
                        .return_document(ReturnDocument::After)
                        .build(),
                ),
            )
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;

        log::info!(
            "Coupon used: code={} usageCount={} totalDiscount={}",
            updated.code,
            updated.usage_count,
            updated.total_discount
        );

        Ok(RedemptionResult {
            original_amount: coupon.amount,
            discount_amount: breakdown.discount_amount,
            order_amount_after_discount: breakdown.amount_after_discount,
            coupon: updated,
        })
    }

    pub async fn toggle_coupon(&self, id: &str) -> Result<Coupon, ApiError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| ApiError::ValidationError("Invalid coupon id".to_string()))?;

        let mut coupon = self
            .coupons
            .find_one(doc! { "_id": object_id }, None)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;

        coupon.active = !coupon.active;
        coupon.updated_at = Utc::now().timestamp_millis();

        self.coupons
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "active": coupon.active, "updatedAt": coupon.updated_at } },
                None,
            )
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(coupon)
    }

    pub async fn delete_coupon(&self, id: &str) -> Result<(), ApiError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| ApiError::ValidationError("Invalid coupon id".to_string()))?;

        let result = self
            .coupons
            .delete_one(doc! { "_id": object_id }, None)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.deleted_count == 0 {
            return Err(ApiError::NotFound("Coupon not found".to_string()));
        }
        Ok(())
    }

    // Member methods

    /// Per-field duplicate probe: both identity fields are checked
    /// independently so the caller can surface every conflict at once.
    pub async fn member_duplicates(
        &self,
        email: &str,
        whatsapp: &str,
    ) -> Result<(bool, bool), ApiError> {
        let email_taken = self
            .members
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(ApiError::DatabaseError)?
            .is_some();

        let whatsapp_taken = self
            .members
            .find_one(doc! { "whatsapp": whatsapp }, None)
            .await
            .map_err(ApiError::DatabaseError)?
            .is_some();

        Ok((email_taken, whatsapp_taken))
    }

    pub async fn create_member(&self, mut member: Member) -> Result<Member, ApiError> {
        if let Some(_existing) = self
            .members
            .find_one(
                doc! {
                    "$or": [
                        { "email": &member.email },
                        { "whatsapp": &member.whatsapp },
                    ]
                },
                None,
            )
            .await
            .map_err(ApiError::DatabaseError)?
        {
            return Err(ApiError::DuplicateError(
                "Email or WhatsApp number already used".to_string(),
            ));
        }

        let result = self.members.insert_one(&member, None).await.map_err(|e| {
            // The unique indexes catch the race between check and insert
            if is_duplicate_key_error(&e) {
                ApiError::DuplicateError("Email or WhatsApp number already used".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        member.id = result.inserted_id.as_object_id();
        Ok(member)
    }

    // Payment methods

    pub async fn create_payment(&self, mut payment: Payment) -> Result<Payment, ApiError> {
        let result = self
            .payments
            .insert_one(&payment, None)
            .await
            .map_err(ApiError::DatabaseError)?;

        payment.id = result.inserted_id.as_object_id();
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::page_skip;

    #[test]
    fn test_page_skip() {
        assert_eq!(page_skip(1, 100), 0);
        assert_eq!(page_skip(3, 50), 100);
    }

    #[test]
    fn test_page_skip_saturates_instead_of_overflowing() {
        assert_eq!(page_skip(u64::MAX, 100), u64::MAX);
        assert_eq!(page_skip(0, 100), 0);
    }
}
