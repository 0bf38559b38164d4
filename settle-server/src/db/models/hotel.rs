//! Hotel read model

use serde::{Deserialize, Serialize};

/// Hotel record, keyed by `hotel:{hotel_id}`
///
/// The two percentage fields override the global hotel-QR split for
/// orders placed through this hotel's QR codes. Validation at write time
/// requires their sum to stay at or below 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub hotel_id: String,
    pub name: String,
    pub hotel_commission_pct: Option<f64>,
    pub admin_commission_pct: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
