//! Delivery partner read model

use serde::{Deserialize, Serialize};

/// Delivery partner record, keyed by `delivery_partner:{partner_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPartner {
    pub partner_id: String,
    pub name: String,
    /// Per-km payout override; `None` falls through to the global rate
    pub per_km_rate: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
