//! Price calculator
//!
//! Computes an order's money breakdown from line items, an optional
//! coupon, and an optional delivery destination. Pure over an injected
//! [`FeeSchedule`]; every monetary step rounds explicitly so drift cannot
//! accumulate into the later commission split.

use crate::db::models::Restaurant;
use crate::fees::FeeSchedule;
use crate::money::{
    AmountError, floor_unit, pct_of, require_finite, round_unit, round2, to_decimal, to_f64,
};
use crate::utils::{GeoPoint, haversine_km};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::coupon::{Coupon, DiscountKind};
use shared::order::OrderItem;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Computed money breakdown for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub subtotal: f64,
    pub discount: f64,
    pub delivery_fee: f64,
    pub platform_fee: f64,
    pub tax: f64,
    pub total: f64,
    /// Straight-line restaurant-to-destination distance, when both ends
    /// are known. Carried so the ordering service can store it.
    pub distance_km: Option<f64>,
}

fn validate_items(items: &[OrderItem]) -> Result<(), PricingError> {
    for item in items {
        require_finite(item.price, "price")?;
        if item.price < 0.0 {
            return Err(PricingError::InvalidOrder(format!(
                "item '{}' has negative price {}",
                item.name, item.price
            )));
        }
        if item.quantity <= 0 {
            return Err(PricingError::InvalidOrder(format!(
                "item '{}' has non-positive quantity {}",
                item.name, item.quantity
            )));
        }
    }
    Ok(())
}

/// Coupon discount against a subtotal. Percentage discounts floor to a
/// whole money unit and honor the coupon cap; no discount may exceed the
/// subtotal itself.
fn resolve_discount(subtotal: Decimal, coupon: Option<&Coupon>) -> Decimal {
    let Some(coupon) = coupon else {
        return Decimal::ZERO;
    };
    if !coupon.is_active {
        tracing::warn!(code = %coupon.code, "Inactive coupon ignored");
        return Decimal::ZERO;
    }

    let raw = match &coupon.discount {
        DiscountKind::Percentage { pct, max_discount } => {
            let mut discount = floor_unit(pct_of(subtotal, *pct));
            if let Some(cap) = max_discount {
                discount = discount.min(to_decimal(*cap));
            }
            discount
        }
        DiscountKind::Flat { amount } => to_decimal(*amount),
    };

    raw.min(subtotal).max(Decimal::ZERO)
}

/// Compute the full price quote for an order.
pub fn quote(
    items: &[OrderItem],
    restaurant: &Restaurant,
    coupon: Option<&Coupon>,
    delivery_point: Option<GeoPoint>,
    schedule: &FeeSchedule,
) -> Result<PriceQuote, PricingError> {
    validate_items(items)?;

    let subtotal: Decimal = items
        .iter()
        .map(|item| to_decimal(item.price) * Decimal::from(item.quantity))
        .sum();
    let subtotal = round2(subtotal);

    if subtotal <= Decimal::ZERO {
        return Err(PricingError::InvalidOrder(format!(
            "subtotal must be positive, got {}",
            subtotal
        )));
    }

    let discount = resolve_discount(subtotal, coupon);

    let delivery_fee = to_decimal(schedule.delivery_fee(
        to_f64(subtotal),
        restaurant.free_delivery_threshold,
    ));

    let distance_km = match (restaurant.location, delivery_point) {
        (Some(origin), Some(dest)) => Some(haversine_km(origin, dest)),
        _ => None,
    };
    let platform_fee = to_decimal(schedule.platform_fee(distance_km));

    // GST on the discounted food value, rounded to the nearest whole unit
    let tax = round_unit(pct_of(subtotal - discount, schedule.gst_rate_pct()));

    let total = round2(subtotal - discount + delivery_fee + platform_fee + tax);

    Ok(PriceQuote {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        delivery_fee: to_f64(delivery_fee),
        platform_fee: to_f64(platform_fee),
        tax: to_f64(tax),
        total: to_f64(total),
        distance_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::FeeSettings;

    fn test_restaurant() -> Restaurant {
        Restaurant {
            restaurant_id: "r-1".to_string(),
            name: "Test Kitchen".to_string(),
            commission_pct: None,
            free_delivery_threshold: None,
            location: None,
            is_active: true,
        }
    }

    fn test_schedule() -> FeeSchedule {
        FeeSchedule::new(FeeSettings::default())
    }

    fn item(price: f64, quantity: i32) -> OrderItem {
        OrderItem {
            name: "Item".to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_basic_quote_below_free_delivery() {
        let quote = quote(
            &[item(50.0, 2)],
            &test_restaurant(),
            None,
            None,
            &test_schedule(),
        )
        .unwrap();

        assert_eq!(quote.subtotal, 100.0);
        assert_eq!(quote.discount, 0.0);
        assert_eq!(quote.delivery_fee, 25.0);
        assert_eq!(quote.platform_fee, 5.0); // flat, no distance
        assert_eq!(quote.tax, 5.0); // 5% of 100
        assert_eq!(quote.total, 135.0);
    }

    #[test]
    fn test_free_delivery_at_threshold() {
        let quote = quote(
            &[item(149.0, 1)],
            &test_restaurant(),
            None,
            None,
            &test_schedule(),
        )
        .unwrap();
        assert_eq!(quote.delivery_fee, 0.0);
    }

    #[test]
    fn test_restaurant_threshold_wins() {
        let mut restaurant = test_restaurant();
        restaurant.free_delivery_threshold = Some(500.0);
        let quote = quote(&[item(200.0, 1)], &restaurant, None, None, &test_schedule()).unwrap();
        assert_eq!(quote.delivery_fee, 25.0);
    }

    #[test]
    fn test_empty_order_rejected() {
        let result = quote(&[], &test_restaurant(), None, None, &test_schedule());
        assert!(matches!(result, Err(PricingError::InvalidOrder(_))));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = quote(&[item(10.0, 0)], &test_restaurant(), None, None, &test_schedule());
        assert!(matches!(result, Err(PricingError::InvalidOrder(_))));
    }

    #[test]
    fn test_percentage_discount_floors_to_unit() {
        let coupon = Coupon {
            code: "TEN".to_string(),
            discount: DiscountKind::Percentage {
                pct: 10.0,
                max_discount: None,
            },
            is_active: true,
        };
        // 10% of 333 = 33.3, floored to 33
        let quote = quote(
            &[item(333.0, 1)],
            &test_restaurant(),
            Some(&coupon),
            None,
            &test_schedule(),
        )
        .unwrap();
        assert_eq!(quote.discount, 33.0);
        // tax = 5% of 300 = 15
        assert_eq!(quote.tax, 15.0);
    }

    #[test]
    fn test_percentage_discount_capped() {
        let coupon = Coupon {
            code: "BIG".to_string(),
            discount: DiscountKind::Percentage {
                pct: 50.0,
                max_discount: Some(100.0),
            },
            is_active: true,
        };
        let quote = quote(
            &[item(1000.0, 1)],
            &test_restaurant(),
            Some(&coupon),
            None,
            &test_schedule(),
        )
        .unwrap();
        assert_eq!(quote.discount, 100.0);
    }

    #[test]
    fn test_flat_discount_capped_by_subtotal() {
        let coupon = Coupon {
            code: "FLAT500".to_string(),
            discount: DiscountKind::Flat { amount: 500.0 },
            is_active: true,
        };
        let quote = quote(
            &[item(120.0, 1)],
            &test_restaurant(),
            Some(&coupon),
            None,
            &test_schedule(),
        )
        .unwrap();
        // Discount capped at the subtotal, chargeable food value zero
        assert_eq!(quote.discount, 120.0);
        assert_eq!(quote.tax, 0.0);
        // Fees still apply
        assert_eq!(quote.total, quote.delivery_fee + quote.platform_fee);
        assert!(quote.total >= 0.0);
    }

    #[test]
    fn test_inactive_coupon_ignored() {
        let coupon = Coupon {
            code: "OLD".to_string(),
            discount: DiscountKind::Flat { amount: 50.0 },
            is_active: false,
        };
        let quote = quote(
            &[item(200.0, 1)],
            &test_restaurant(),
            Some(&coupon),
            None,
            &test_schedule(),
        )
        .unwrap();
        assert_eq!(quote.discount, 0.0);
    }

    #[test]
    fn test_platform_fee_from_distance() {
        let mut restaurant = test_restaurant();
        restaurant.location = Some(GeoPoint { lat: 28.6315, lng: 77.2167 });
        // A destination roughly 13-16 km away lands in the second band
        let destination = GeoPoint { lat: 28.5562, lng: 77.1000 };

        let quote = quote(
            &[item(200.0, 1)],
            &restaurant,
            None,
            Some(destination),
            &test_schedule(),
        )
        .unwrap();

        assert!(quote.distance_km.is_some());
        assert_eq!(quote.platform_fee, 8.0);
    }

    #[test]
    fn test_nan_price_rejected() {
        let result = quote(
            &[item(f64::NAN, 1)],
            &test_restaurant(),
            None,
            None,
            &test_schedule(),
        );
        assert!(matches!(result, Err(PricingError::Amount(_))));
    }
}
