//! Fee and commission configuration
//!
//! A single active `FeeSettings` record drives every calculation. Each
//! edit bumps `version` and is validated here before it is persisted, so
//! settlement-time code never has to re-check percentage sums.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors, surfaced at write time
#[derive(Debug, Error)]
pub enum FeeValidationError {
    #[error("Fee band invalid: {0}")]
    BadBand(String),

    #[error("Percentage out of range: {0}")]
    BadPercentage(String),

    #[error("Hotel-QR split exceeds 100%: hotel + admin = {sum}")]
    QrSplitExceeds { sum: f64 },

    #[error("Direct split must total exactly 100%: admin + restaurant = {sum}")]
    DirectSplitNotExact { sum: f64 },

    #[error("Rate invalid: {0}")]
    BadRate(String),
}

/// A fee band over `[min, max)`. The last band in a list matches its max
/// inclusively so the top of the range is covered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeBand {
    pub min: f64,
    pub max: f64,
    pub fee: f64,
}

impl FeeBand {
    fn contains(&self, value: f64, is_last: bool) -> bool {
        if is_last {
            value >= self.min && value <= self.max
        } else {
            value >= self.min && value < self.max
        }
    }
}

/// Resolve a value against a band list. Returns `None` when no band
/// matches, letting the caller fall back to a flat default.
pub fn resolve_band(bands: &[FeeBand], value: f64) -> Option<f64> {
    let last = bands.len().checked_sub(1)?;
    bands
        .iter()
        .enumerate()
        .find(|(i, band)| band.contains(value, *i == last))
        .map(|(_, band)| band.fee)
}

/// Percentage pair for the hotel-QR split
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModePercentages {
    pub hotel_pct: f64,
    pub admin_pct: f64,
}

/// Percentage pair for the direct split
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectPercentages {
    pub admin_pct: f64,
    pub restaurant_pct: f64,
}

/// Active fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSettings {
    /// Bumped on every edit; captured into settlement calculation snapshots
    pub version: u32,

    /// Delivery fee bands keyed by order value
    pub delivery_fee_bands: Vec<FeeBand>,
    /// Fallback when no delivery band matches
    pub default_delivery_fee: f64,
    /// Orders at or above this value ship free (restaurants may override)
    pub free_delivery_threshold: f64,

    /// Platform fee bands keyed by delivery distance (km)
    pub platform_fee_bands: Vec<FeeBand>,
    /// Flat platform fee when no distance is available
    pub platform_fee_flat: f64,

    /// GST rate applied to (subtotal - discount)
    pub gst_rate_pct: f64,

    /// Default split for hotel-QR orders (per-hotel overridable)
    pub hotel_qr: ModePercentages,
    /// Default split for direct orders
    pub direct: DirectPercentages,

    /// Delivery partner payout per km
    pub delivery_per_km_rate: f64,
    /// Payout multiplier during surge windows; 1.0 means no surge
    pub surge_multiplier: f64,

    pub updated_at: i64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            version: 0,
            delivery_fee_bands: vec![
                FeeBand { min: 0.0, max: 500.0, fee: 25.0 },
                FeeBand { min: 500.0, max: 1000.0, fee: 35.0 },
            ],
            default_delivery_fee: 25.0,
            free_delivery_threshold: 149.0,
            platform_fee_bands: vec![
                FeeBand { min: 0.0, max: 5.0, fee: 5.0 },
                FeeBand { min: 5.0, max: 15.0, fee: 8.0 },
            ],
            platform_fee_flat: 5.0,
            gst_rate_pct: 5.0,
            hotel_qr: ModePercentages {
                hotel_pct: 10.0,
                admin_pct: 10.0,
            },
            direct: DirectPercentages {
                admin_pct: 20.0,
                restaurant_pct: 80.0,
            },
            delivery_per_km_rate: 10.0,
            surge_multiplier: 1.0,
            updated_at: 0,
        }
    }
}

fn validate_pct(value: f64, name: &str) -> Result<(), FeeValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(FeeValidationError::BadPercentage(format!(
            "{} must be between 0 and 100, got {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_bands(bands: &[FeeBand], name: &str) -> Result<(), FeeValidationError> {
    let mut prev_max: Option<f64> = None;
    for band in bands {
        if !band.min.is_finite() || !band.max.is_finite() || !band.fee.is_finite() {
            return Err(FeeValidationError::BadBand(format!(
                "{} band has non-finite values",
                name
            )));
        }
        if band.min >= band.max {
            return Err(FeeValidationError::BadBand(format!(
                "{} band [{}, {}) is empty",
                name, band.min, band.max
            )));
        }
        if band.fee < 0.0 {
            return Err(FeeValidationError::BadBand(format!(
                "{} band fee must be non-negative, got {}",
                name, band.fee
            )));
        }
        if let Some(prev) = prev_max {
            if band.min < prev {
                return Err(FeeValidationError::BadBand(format!(
                    "{} bands overlap at {}",
                    name, band.min
                )));
            }
        }
        prev_max = Some(band.max);
    }
    Ok(())
}

impl FeeSettings {
    /// Validate a configuration before it is written.
    ///
    /// The two split rules are intentionally asymmetric. Hotel-QR leaves a
    /// variable residual for the restaurant, so only the ceiling is
    /// checked; the direct split names both sides and must total exactly.
    pub fn validate(&self) -> Result<(), FeeValidationError> {
        validate_bands(&self.delivery_fee_bands, "delivery")?;
        validate_bands(&self.platform_fee_bands, "platform")?;

        validate_pct(self.gst_rate_pct, "gst_rate_pct")?;
        validate_pct(self.hotel_qr.hotel_pct, "hotel_pct")?;
        validate_pct(self.hotel_qr.admin_pct, "hotel-qr admin_pct")?;
        validate_pct(self.direct.admin_pct, "direct admin_pct")?;
        validate_pct(self.direct.restaurant_pct, "direct restaurant_pct")?;

        // Exact sums via Decimal so 33.3 + 66.7 style configs behave
        let qr_sum = Decimal::from_f64(self.hotel_qr.hotel_pct).unwrap_or_default()
            + Decimal::from_f64(self.hotel_qr.admin_pct).unwrap_or_default();
        if qr_sum > Decimal::ONE_HUNDRED {
            return Err(FeeValidationError::QrSplitExceeds {
                sum: qr_sum.to_f64().unwrap_or(f64::NAN),
            });
        }

        let direct_sum = Decimal::from_f64(self.direct.admin_pct).unwrap_or_default()
            + Decimal::from_f64(self.direct.restaurant_pct).unwrap_or_default();
        if direct_sum != Decimal::ONE_HUNDRED {
            return Err(FeeValidationError::DirectSplitNotExact {
                sum: direct_sum.to_f64().unwrap_or(f64::NAN),
            });
        }

        for (value, name) in [
            (self.default_delivery_fee, "default_delivery_fee"),
            (self.free_delivery_threshold, "free_delivery_threshold"),
            (self.platform_fee_flat, "platform_fee_flat"),
            (self.delivery_per_km_rate, "delivery_per_km_rate"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FeeValidationError::BadRate(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !self.surge_multiplier.is_finite() || self.surge_multiplier < 1.0 {
            return Err(FeeValidationError::BadRate(format!(
                "surge_multiplier must be >= 1.0, got {}",
                self.surge_multiplier
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(FeeSettings::default().validate().is_ok());
    }

    #[test]
    fn test_band_resolution_half_open() {
        let bands = vec![
            FeeBand { min: 0.0, max: 500.0, fee: 25.0 },
            FeeBand { min: 500.0, max: 1000.0, fee: 35.0 },
        ];
        assert_eq!(resolve_band(&bands, 0.0), Some(25.0));
        assert_eq!(resolve_band(&bands, 499.99), Some(25.0));
        // Boundary belongs to the next band
        assert_eq!(resolve_band(&bands, 500.0), Some(35.0));
        // Last band max is inclusive
        assert_eq!(resolve_band(&bands, 1000.0), Some(35.0));
        assert_eq!(resolve_band(&bands, 1000.01), None);
    }

    #[test]
    fn test_band_resolution_empty_list() {
        assert_eq!(resolve_band(&[], 100.0), None);
    }

    #[test]
    fn test_qr_split_ceiling() {
        let mut settings = FeeSettings::default();
        settings.hotel_qr = ModePercentages {
            hotel_pct: 60.0,
            admin_pct: 50.0,
        };
        assert!(matches!(
            settings.validate(),
            Err(FeeValidationError::QrSplitExceeds { .. })
        ));

        // Exactly 100 is allowed (restaurant residual becomes zero)
        settings.hotel_qr = ModePercentages {
            hotel_pct: 60.0,
            admin_pct: 40.0,
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_direct_split_must_be_exact() {
        let mut settings = FeeSettings::default();
        settings.direct = DirectPercentages {
            admin_pct: 30.0,
            restaurant_pct: 60.0,
        };
        assert!(matches!(
            settings.validate(),
            Err(FeeValidationError::DirectSplitNotExact { .. })
        ));

        settings.direct = DirectPercentages {
            admin_pct: 30.0,
            restaurant_pct: 70.0,
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut settings = FeeSettings::default();
        settings.delivery_fee_bands = vec![
            FeeBand { min: 0.0, max: 500.0, fee: 25.0 },
            FeeBand { min: 400.0, max: 900.0, fee: 35.0 },
        ];
        assert!(matches!(
            settings.validate(),
            Err(FeeValidationError::BadBand(_))
        ));
    }

    #[test]
    fn test_surge_below_one_rejected() {
        let mut settings = FeeSettings::default();
        settings.surge_multiplier = 0.5;
        assert!(matches!(
            settings.validate(),
            Err(FeeValidationError::BadRate(_))
        ));
    }
}
