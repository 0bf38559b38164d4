//! Coupon model

use serde::{Deserialize, Serialize};

/// Discount shape carried by a coupon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// Percentage of the subtotal, optionally capped
    Percentage { pct: f64, max_discount: Option<f64> },
    /// Fixed amount off
    Flat { amount: f64 },
}

/// Coupon entity (read-only here; issuance is handled elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount: DiscountKind,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
