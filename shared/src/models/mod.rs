//! Configuration models
//!
//! Externally managed configuration read by the settlement node. Writes
//! happen in the admin console service; validation rules live here so
//! both sides agree on what a well-formed configuration is.

pub mod coupon;
pub mod fee_settings;

pub use coupon::{Coupon, DiscountKind};
pub use fee_settings::{
    DirectPercentages, FeeBand, FeeSettings, FeeValidationError, ModePercentages,
};
