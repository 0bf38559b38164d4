//! Order read model
//!
//! Orders are owned by the order-management service. The settlement node
//! reads them, and writes back only the commission breakdown and the
//! `commission_distributed` flag once a distribution has fully succeeded.

use serde::{Deserialize, Serialize};

/// Order channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Direct delivery order placed through the app
    Direct,
    /// Dine-in order placed by scanning a hotel room/table QR code
    HotelQr,
}

/// Order lifecycle status
///
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether a transition to `next` is allowed
    pub fn can_transition(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (*self, next),
            (Created, Confirmed) | (Created, Cancelled) | (Confirmed, Delivered) | (Confirmed, Cancelled)
        )
    }
}

/// A single ordered line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

/// Monetary breakdown persisted on the order by the ordering service
///
/// All fields are non-negative and rounded to 2 decimal places.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub platform_fee: f64,
    #[serde(default)]
    pub tax: f64,
    pub total: f64,
}

/// Cached three-way commission split for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub hotel: f64,
    pub admin: f64,
    pub restaurant: f64,
}

/// The percentages that produced a cached breakdown
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CommissionPercentages {
    pub hotel_pct: f64,
    pub admin_pct: f64,
}

/// Order read model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub pricing: OrderPricing,
    pub restaurant_id: String,
    pub hotel_id: Option<String>,
    pub delivery_partner_id: Option<String>,
    /// Resolved delivery distance, set when a partner is assigned
    pub delivery_distance_km: Option<f64>,
    #[serde(default)]
    pub commission_breakdown: Option<CommissionBreakdown>,
    #[serde(default)]
    pub commission_percentages: Option<CommissionPercentages>,
    /// Set exactly once, after every beneficiary credit has succeeded
    #[serde(default)]
    pub commission_distributed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_hotel_qr(&self) -> bool {
        self.order_type == OrderType::HotelQr
    }
}

/// Status-change notification delivered by the ordering service after the
/// order record has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub order_id: String,
    pub previous: OrderStatus,
    pub next: OrderStatus,
}
