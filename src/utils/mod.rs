pub mod discount;
pub mod rate_limit;
pub mod validators;
