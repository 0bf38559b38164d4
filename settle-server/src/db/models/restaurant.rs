//! Restaurant read model

use crate::utils::GeoPoint;
use serde::{Deserialize, Serialize};

/// Restaurant record, keyed by `restaurant:{restaurant_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: String,
    pub name: String,
    /// Admin commission override for direct orders (percentage).
    /// `None` falls through to the global default.
    pub commission_pct: Option<f64>,
    /// Free-delivery threshold override. Takes precedence over the
    /// global threshold when set.
    pub free_delivery_threshold: Option<f64>,
    /// Kitchen location, used for delivery distance calculation
    pub location: Option<GeoPoint>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
