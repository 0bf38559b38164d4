//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization. Monetary values are never compared with
//! raw equality; use [`money_eq`] or round both sides first.

use rust_decimal::prelude::*;
use thiserror::Error;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed monetary amount in any single field
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Boundary validation errors for monetary inputs
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} exceeds maximum allowed ({max}), got {value}")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("{field} must be between 0 and 100, got {value}")]
    BadPercentage { field: &'static str, value: f64 },
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field: &'static str) -> Result<(), AmountError> {
    if !value.is_finite() {
        return Err(AmountError::NotFinite { field, value });
    }
    Ok(())
}

/// Validate a monetary amount: finite, strictly positive, bounded
pub fn validate_amount(value: f64, field: &'static str) -> Result<(), AmountError> {
    require_finite(value, field)?;
    if value <= 0.0 {
        return Err(AmountError::NotPositive { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(AmountError::TooLarge {
            field,
            value,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Validate a percentage: finite and within [0, 100]
pub fn validate_percentage(value: f64, field: &'static str) -> Result<(), AmountError> {
    require_finite(value, field)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(AmountError::BadPercentage { field, value });
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
///
/// Inputs should be pre-validated via [`require_finite`] at the boundary.
/// If NaN/Infinity somehow reaches here, logs an error and returns ZERO
/// to avoid silent corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the nearest whole money unit (used for tax)
#[inline]
pub fn round_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Floor to a whole money unit (used for percentage discounts)
#[inline]
pub fn floor_unit(value: Decimal) -> Decimal {
    value.floor()
}

/// Percentage of a value: `value * pct / 100`, unrounded
#[inline]
pub fn pct_of(value: Decimal, pct: f64) -> Decimal {
    value * to_decimal(pct) / Decimal::ONE_HUNDRED
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(to_f64(Decimal::new(5, 3)), 0.01); // 0.005 → 0.01
        assert_eq!(to_f64(Decimal::new(4, 3)), 0.0); // 0.004 → 0.00
    }

    #[test]
    fn test_round_unit() {
        assert_eq!(round_unit(to_decimal(49.4)), Decimal::from(49));
        assert_eq!(round_unit(to_decimal(49.5)), Decimal::from(50));
    }

    #[test]
    fn test_floor_unit() {
        assert_eq!(floor_unit(to_decimal(49.99)), Decimal::from(49));
        assert_eq!(floor_unit(to_decimal(50.0)), Decimal::from(50));
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.006));
        assert!(!money_eq(100.0, 100.02));
    }

    #[test]
    fn test_to_decimal_non_finite_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(f64::NEG_INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(f64::MAX), Decimal::ZERO);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(10.0, "amount").is_ok());
        assert!(matches!(
            validate_amount(0.0, "amount"),
            Err(AmountError::NotPositive { .. })
        ));
        assert!(matches!(
            validate_amount(-5.0, "amount"),
            Err(AmountError::NotPositive { .. })
        ));
        assert!(matches!(
            validate_amount(f64::NAN, "amount"),
            Err(AmountError::NotFinite { .. })
        ));
        assert!(matches!(
            validate_amount(MAX_AMOUNT + 1.0, "amount"),
            Err(AmountError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0, "pct").is_ok());
        assert!(validate_percentage(100.0, "pct").is_ok());
        assert!(matches!(
            validate_percentage(100.01, "pct"),
            Err(AmountError::BadPercentage { .. })
        ));
        assert!(matches!(
            validate_percentage(-1.0, "pct"),
            Err(AmountError::BadPercentage { .. })
        ));
    }

    #[test]
    fn test_pct_of() {
        assert_eq!(to_f64(pct_of(to_decimal(1000.0), 15.0)), 150.0);
        assert_eq!(to_f64(pct_of(to_decimal(500.0), 30.0)), 150.0);
    }
}
