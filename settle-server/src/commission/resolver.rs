//! Commission resolver
//!
//! Two explicitly separate split modes. Hotel-QR: hotel and admin take
//! their percentages, the restaurant keeps the variable residual.
//! Direct: admin takes its percentage, the restaurant keeps the rest,
//! and configuration guarantees the two percentages total 100.
//!
//! Percentage resolution is one pure cascade with a fixed precedence:
//! the order's own cached percentages win, then the current entity
//! override fields, then the global defaults. The chosen source is
//! reported so calculation snapshots can record it.
//!
//! Shares are rounded to 2 decimals individually and the rounding
//! residual is absorbed into the restaurant share, so the three shares
//! always re-sum to the subtotal exactly.

use crate::db::models::{Hotel, Restaurant};
use crate::fees::FeeSchedule;
use crate::money::{AmountError, pct_of, round2, to_decimal, to_f64, validate_percentage};
use rust_decimal::Decimal;
use shared::order::{CommissionBreakdown, CommissionPercentages, Order};
use shared::settlement::CommissionSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommissionError {
    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Split percentages exceed 100: hotel {hotel_pct} + admin {admin_pct}")]
    SplitExceedsWhole { hotel_pct: f64, admin_pct: f64 },
}

/// Percentages chosen by the cascade, with their provenance
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPercentages {
    pub hotel_pct: f64,
    pub admin_pct: f64,
    pub source: CommissionSource,
}

impl ResolvedPercentages {
    pub fn as_stored(&self) -> CommissionPercentages {
        CommissionPercentages {
            hotel_pct: self.hotel_pct,
            admin_pct: self.admin_pct,
        }
    }
}

/// Three-way split of an order subtotal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionSplit {
    pub hotel: f64,
    pub admin: f64,
    pub restaurant: f64,
}

impl CommissionSplit {
    pub fn as_breakdown(&self) -> CommissionBreakdown {
        CommissionBreakdown {
            hotel: self.hotel,
            admin: self.admin,
            restaurant: self.restaurant,
        }
    }
}

/// Resolve the percentage pair for a hotel-QR order.
///
/// Precedence: order snapshot, then hotel override fields, then global
/// defaults. Orders created before percentage caching existed fall
/// through the cascade naturally.
pub fn resolve_hotel_qr_percentages(
    order: &Order,
    hotel: Option<&Hotel>,
    schedule: &FeeSchedule,
) -> ResolvedPercentages {
    if let Some(stored) = &order.commission_percentages {
        return ResolvedPercentages {
            hotel_pct: stored.hotel_pct,
            admin_pct: stored.admin_pct,
            source: CommissionSource::OrderSnapshot,
        };
    }

    if let Some(hotel) = hotel
        && let (Some(hotel_pct), Some(admin_pct)) =
            (hotel.hotel_commission_pct, hotel.admin_commission_pct)
    {
        return ResolvedPercentages {
            hotel_pct,
            admin_pct,
            source: CommissionSource::EntityOverride,
        };
    }

    let defaults = schedule.hotel_qr_defaults();
    ResolvedPercentages {
        hotel_pct: defaults.hotel_pct,
        admin_pct: defaults.admin_pct,
        source: CommissionSource::GlobalDefault,
    }
}

/// Resolve the admin percentage for a direct order. There is no hotel
/// share; `hotel_pct` is carried as zero so both modes share one shape.
pub fn resolve_direct_percentages(
    order: &Order,
    restaurant: Option<&Restaurant>,
    schedule: &FeeSchedule,
) -> ResolvedPercentages {
    if let Some(stored) = &order.commission_percentages {
        return ResolvedPercentages {
            hotel_pct: 0.0,
            admin_pct: stored.admin_pct,
            source: CommissionSource::OrderSnapshot,
        };
    }

    if let Some(restaurant) = restaurant
        && let Some(admin_pct) = restaurant.commission_pct
    {
        return ResolvedPercentages {
            hotel_pct: 0.0,
            admin_pct,
            source: CommissionSource::EntityOverride,
        };
    }

    ResolvedPercentages {
        hotel_pct: 0.0,
        admin_pct: schedule.direct_admin_pct(),
        source: CommissionSource::GlobalDefault,
    }
}

/// Hotel-QR split: hotel and admin shares are percentage cuts of the
/// subtotal, the restaurant keeps the remainder. The remainder also
/// absorbs rounding, keeping `hotel + admin + restaurant == subtotal`.
pub fn split_hotel_qr(
    subtotal: f64,
    hotel_pct: f64,
    admin_pct: f64,
) -> Result<CommissionSplit, CommissionError> {
    validate_percentage(hotel_pct, "hotel_pct")?;
    validate_percentage(admin_pct, "admin_pct")?;
    if to_decimal(hotel_pct) + to_decimal(admin_pct) > Decimal::ONE_HUNDRED {
        return Err(CommissionError::SplitExceedsWhole {
            hotel_pct,
            admin_pct,
        });
    }

    let subtotal = to_decimal(subtotal);
    let hotel = round2(pct_of(subtotal, hotel_pct));
    let admin = round2(pct_of(subtotal, admin_pct));
    let restaurant = subtotal - hotel - admin;

    Ok(CommissionSplit {
        hotel: to_f64(hotel),
        admin: to_f64(admin),
        restaurant: to_f64(restaurant),
    })
}

/// Direct split: admin takes its cut, the restaurant keeps the rest.
pub fn split_direct(subtotal: f64, admin_pct: f64) -> Result<CommissionSplit, CommissionError> {
    validate_percentage(admin_pct, "admin_pct")?;

    let subtotal = to_decimal(subtotal);
    let admin = round2(pct_of(subtotal, admin_pct));
    let restaurant = subtotal - admin;

    Ok(CommissionSplit {
        hotel: 0.0,
        admin: to_f64(admin),
        restaurant: to_f64(restaurant),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::money_eq;
    use shared::models::FeeSettings;
    use shared::order::{OrderPricing, OrderStatus, OrderType};

    fn schedule() -> FeeSchedule {
        FeeSchedule::new(FeeSettings::default())
    }

    fn qr_order() -> Order {
        Order {
            order_id: "o-1".to_string(),
            order_type: OrderType::HotelQr,
            status: OrderStatus::Confirmed,
            items: vec![],
            pricing: OrderPricing::default(),
            restaurant_id: "r-1".to_string(),
            hotel_id: Some("h-1".to_string()),
            delivery_partner_id: None,
            delivery_distance_km: None,
            commission_breakdown: None,
            commission_percentages: None,
            commission_distributed: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn hotel_with(hotel_pct: Option<f64>, admin_pct: Option<f64>) -> Hotel {
        Hotel {
            hotel_id: "h-1".to_string(),
            name: "Test Hotel".to_string(),
            hotel_commission_pct: hotel_pct,
            admin_commission_pct: admin_pct,
            is_active: true,
        }
    }

    #[test]
    fn test_hotel_qr_split_reference_case() {
        let split = split_hotel_qr(1000.0, 15.0, 10.0).unwrap();
        assert_eq!(split.hotel, 150.0);
        assert_eq!(split.admin, 100.0);
        assert_eq!(split.restaurant, 750.0);
    }

    #[test]
    fn test_direct_split_reference_case() {
        let split = split_direct(500.0, 30.0).unwrap();
        assert_eq!(split.admin, 150.0);
        assert_eq!(split.restaurant, 350.0);
        assert!(money_eq(split.admin + split.restaurant, 500.0));
    }

    #[test]
    fn test_split_resums_to_subtotal_with_awkward_percentages() {
        for subtotal in [100.0, 99.99, 1234.56, 0.03] {
            let split = split_hotel_qr(subtotal, 33.33, 33.33).unwrap();
            let sum = to_decimal(split.hotel) + to_decimal(split.admin) + to_decimal(split.restaurant);
            assert_eq!(
                to_f64(sum),
                subtotal,
                "shares must re-sum exactly for subtotal {}",
                subtotal
            );
        }
    }

    #[test]
    fn test_rounding_residual_lands_on_restaurant() {
        // 33.33% of 100 rounds to 33.33 twice; the 0.01 residual stays
        // with the restaurant instead of vanishing
        let split = split_hotel_qr(100.0, 33.33, 33.33).unwrap();
        assert_eq!(split.hotel, 33.33);
        assert_eq!(split.admin, 33.33);
        assert_eq!(split.restaurant, 33.34);
    }

    #[test]
    fn test_full_split_leaves_restaurant_zero() {
        let split = split_hotel_qr(200.0, 60.0, 40.0).unwrap();
        assert_eq!(split.restaurant, 0.0);
    }

    #[test]
    fn test_split_over_100_rejected() {
        assert!(matches!(
            split_hotel_qr(100.0, 70.0, 40.0),
            Err(CommissionError::SplitExceedsWhole { .. })
        ));
    }

    #[test]
    fn test_bad_percentage_rejected() {
        assert!(split_hotel_qr(100.0, -5.0, 10.0).is_err());
        assert!(split_direct(100.0, 120.0).is_err());
    }

    #[test]
    fn test_precedence_order_snapshot_wins() {
        let mut order = qr_order();
        order.commission_percentages = Some(CommissionPercentages {
            hotel_pct: 12.0,
            admin_pct: 8.0,
        });
        let hotel = hotel_with(Some(20.0), Some(20.0));

        let resolved = resolve_hotel_qr_percentages(&order, Some(&hotel), &schedule());
        assert_eq!(resolved.hotel_pct, 12.0);
        assert_eq!(resolved.admin_pct, 8.0);
        assert_eq!(resolved.source, CommissionSource::OrderSnapshot);
    }

    #[test]
    fn test_precedence_entity_override_second() {
        let order = qr_order();
        let hotel = hotel_with(Some(20.0), Some(15.0));

        let resolved = resolve_hotel_qr_percentages(&order, Some(&hotel), &schedule());
        assert_eq!(resolved.hotel_pct, 20.0);
        assert_eq!(resolved.admin_pct, 15.0);
        assert_eq!(resolved.source, CommissionSource::EntityOverride);
    }

    #[test]
    fn test_precedence_partial_override_falls_through() {
        // Only one of the pair is set; the cascade moves on to defaults
        let order = qr_order();
        let hotel = hotel_with(Some(20.0), None);

        let resolved = resolve_hotel_qr_percentages(&order, Some(&hotel), &schedule());
        assert_eq!(resolved.source, CommissionSource::GlobalDefault);
        assert_eq!(resolved.hotel_pct, 10.0);
        assert_eq!(resolved.admin_pct, 10.0);
    }

    #[test]
    fn test_precedence_global_default_last() {
        let order = qr_order();
        let resolved = resolve_hotel_qr_percentages(&order, None, &schedule());
        assert_eq!(resolved.source, CommissionSource::GlobalDefault);
    }

    #[test]
    fn test_direct_precedence_restaurant_override() {
        let mut order = qr_order();
        order.order_type = OrderType::Direct;
        let restaurant = Restaurant {
            restaurant_id: "r-1".to_string(),
            name: "Test Kitchen".to_string(),
            commission_pct: Some(25.0),
            free_delivery_threshold: None,
            location: None,
            is_active: true,
        };

        let resolved = resolve_direct_percentages(&order, Some(&restaurant), &schedule());
        assert_eq!(resolved.admin_pct, 25.0);
        assert_eq!(resolved.hotel_pct, 0.0);
        assert_eq!(resolved.source, CommissionSource::EntityOverride);

        let resolved = resolve_direct_percentages(&order, None, &schedule());
        assert_eq!(resolved.admin_pct, 20.0);
        assert_eq!(resolved.source, CommissionSource::GlobalDefault);
    }
}
