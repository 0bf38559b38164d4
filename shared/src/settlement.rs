//! Settlement snapshot types
//!
//! One settlement per order, created on the first calculation and updated
//! on order status transitions. Never deleted.

use serde::{Deserialize, Serialize};

/// Whether the customer's payment is held, released to beneficiaries, or
/// returned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    Pending,
    Released,
    Refunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Per-earning payout state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarningStatus {
    Pending,
    Completed,
    Cancelled,
}

/// What the customer paid, copied from the order's stored pricing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPayment {
    pub subtotal: f64,
    pub discount: f64,
    pub delivery_fee: f64,
    pub platform_fee: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantEarning {
    /// Food value of the order (the subtotal)
    pub food_price: f64,
    /// Commission retained by the platform and, for QR orders, the hotel
    pub commission: f64,
    pub net_earning: f64,
    pub status: EarningStatus,
}

/// Present only for hotel-QR orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelEarning {
    pub amount: f64,
    pub commission_pct: f64,
    pub status: EarningStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPartnerEarning {
    pub base_payout: f64,
    pub distance_km: f64,
    pub per_km_rate: f64,
    /// `base_payout * (surge_multiplier - 1)`, zero when no surge
    pub surge_amount: f64,
    pub total: f64,
    pub status: EarningStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminEarning {
    pub commission: f64,
    pub platform_fee: f64,
    /// Delivery fee charged to the customer minus the partner payout
    pub delivery_margin: f64,
    pub total: f64,
}

/// Where the percentages used for a calculation came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionSource {
    /// Cached on the order itself
    OrderSnapshot,
    /// Current override fields on the hotel/restaurant record
    EntityOverride,
    /// Global fee settings
    GlobalDefault,
}

/// Versions and inputs captured at calculation time so the settlement can
/// be replayed against the exact rules that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationSnapshot {
    pub fee_settings_version: u32,
    pub commission_source: CommissionSource,
    pub hotel_pct: f64,
    pub admin_pct: f64,
    pub calculated_at: i64,
}

/// Full settlement record, 1:1 with an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub order_id: String,
    pub user_payment: UserPayment,
    pub restaurant_earning: RestaurantEarning,
    pub hotel_earning: Option<HotelEarning>,
    pub delivery_partner_earning: Option<DeliveryPartnerEarning>,
    pub admin_earning: AdminEarning,
    pub escrow_status: EscrowStatus,
    pub settlement_status: SettlementStatus,
    pub calculation_snapshot: CalculationSnapshot,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_roundtrip() {
        let settlement = Settlement {
            order_id: "o-1".to_string(),
            user_payment: UserPayment {
                subtotal: 1000.0,
                discount: 0.0,
                delivery_fee: 0.0,
                platform_fee: 5.0,
                tax: 50.0,
                total: 1055.0,
            },
            restaurant_earning: RestaurantEarning {
                food_price: 1000.0,
                commission: 250.0,
                net_earning: 750.0,
                status: EarningStatus::Pending,
            },
            hotel_earning: Some(HotelEarning {
                amount: 150.0,
                commission_pct: 15.0,
                status: EarningStatus::Pending,
            }),
            delivery_partner_earning: None,
            admin_earning: AdminEarning {
                commission: 100.0,
                platform_fee: 5.0,
                delivery_margin: 0.0,
                total: 105.0,
            },
            escrow_status: EscrowStatus::Pending,
            settlement_status: SettlementStatus::Pending,
            calculation_snapshot: CalculationSnapshot {
                fee_settings_version: 1,
                commission_source: CommissionSource::GlobalDefault,
                hotel_pct: 15.0,
                admin_pct: 10.0,
                calculated_at: 0,
            },
            created_at: 0,
            updated_at: 0,
        };

        let json = serde_json::to_string(&settlement).unwrap();
        let back: Settlement = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order_id, "o-1");
        assert_eq!(back.escrow_status, EscrowStatus::Pending);
        assert_eq!(back.hotel_earning.unwrap().amount, 150.0);
    }
}
