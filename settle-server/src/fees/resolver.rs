//! Fee schedule resolution
//!
//! Calculations never read configuration mid-flight. The resolver loads
//! the active `FeeSettings` once into an immutable [`FeeSchedule`]
//! snapshot, and that snapshot is passed into the calculators. Its
//! version is captured into every settlement so a recomputation against
//! historical rules stays reproducible.

use crate::db::repository::{FeeSettingsRepository, RepoResult};
use shared::models::fee_settings::{FeeSettings, ModePercentages, resolve_band};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Immutable view over one version of the fee configuration
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    settings: FeeSettings,
}

impl FeeSchedule {
    pub fn new(settings: FeeSettings) -> Self {
        Self { settings }
    }

    pub fn version(&self) -> u32 {
        self.settings.version
    }

    /// Delivery fee for an order value. A restaurant-level free-delivery
    /// threshold takes precedence over the global one; below the
    /// threshold the first matching band wins, then the flat default.
    pub fn delivery_fee(&self, order_value: f64, restaurant_threshold: Option<f64>) -> f64 {
        let threshold = restaurant_threshold.unwrap_or(self.settings.free_delivery_threshold);
        if order_value >= threshold {
            return 0.0;
        }
        resolve_band(&self.settings.delivery_fee_bands, order_value)
            .unwrap_or(self.settings.default_delivery_fee)
    }

    /// Platform fee keyed by delivery distance, with a flat fallback when
    /// no distance is available or no band matches.
    pub fn platform_fee(&self, distance_km: Option<f64>) -> f64 {
        match distance_km {
            Some(distance) => resolve_band(&self.settings.platform_fee_bands, distance)
                .unwrap_or(self.settings.platform_fee_flat),
            None => self.settings.platform_fee_flat,
        }
    }

    pub fn gst_rate_pct(&self) -> f64 {
        self.settings.gst_rate_pct
    }

    /// Global default split for hotel-QR orders
    pub fn hotel_qr_defaults(&self) -> ModePercentages {
        self.settings.hotel_qr
    }

    /// Global default admin percentage for direct orders
    pub fn direct_admin_pct(&self) -> f64 {
        self.settings.direct.admin_pct
    }

    /// Delivery payout per km, honoring a partner-level override
    pub fn per_km_rate(&self, partner_override: Option<f64>) -> f64 {
        partner_override.unwrap_or(self.settings.delivery_per_km_rate)
    }

    pub fn surge_multiplier(&self) -> f64 {
        self.settings.surge_multiplier
    }
}

/// Loads the active configuration into schedules
#[derive(Clone)]
pub struct FeeResolver {
    repo: FeeSettingsRepository,
}

impl FeeResolver {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: FeeSettingsRepository::new(db),
        }
    }

    /// Snapshot the currently active configuration. Falls back to the
    /// documented defaults when nothing has been configured yet.
    pub async fn active_schedule(&self) -> RepoResult<FeeSchedule> {
        let settings = match self.repo.active().await? {
            Some(settings) => settings,
            None => {
                tracing::debug!("No fee settings configured, using defaults");
                FeeSettings::default()
            }
        };
        Ok(FeeSchedule::new(settings))
    }

    /// Snapshot a historical configuration version for audit replay
    pub async fn schedule_for_version(&self, version: u32) -> RepoResult<Option<FeeSchedule>> {
        Ok(self.repo.by_version(version).await?.map(FeeSchedule::new))
    }
}
