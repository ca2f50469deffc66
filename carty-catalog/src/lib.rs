pub mod plan;
pub mod coupon;
pub mod pricing;
pub mod filter;

pub use coupon::{Coupon, CouponSlot};
pub use filter::{CarFilter, SortOrder};
pub use plan::{PlanTier, ProtectionPlan};
pub use pricing::PriceQuote;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown plan '{0}'")]
    UnknownPlan(String),
    #[error("Invalid coupon code")]
    UnknownCoupon(String),
    #[error("Invalid filter value for {field}: {value}")]
    InvalidFilter { field: String, value: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
