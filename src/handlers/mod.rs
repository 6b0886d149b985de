pub mod coupon_handlers;
pub mod membership_handlers;
pub mod payment_handlers;
pub mod mail_handlers;
