pub mod coupon;
pub mod member;
pub mod order;
pub mod payment;
pub mod error;

pub use coupon::{Coupon, CouponUsage, CreateCouponRequest, ListCouponsQuery, RedemptionResult};
pub use member::{CheckDuplicateRequest, Member, RegisterMemberRequest};
pub use order::Order;
pub use payment::{CardDetails, Payment, PaymentMethod, RecordPaymentRequest, UpiDetails};
pub use error::{ApiError, ErrorResponse, FieldError};
