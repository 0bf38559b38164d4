//! Straight-line distance helpers

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Haversine great-circle distance between two points, in kilometers
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint { lat: 28.6139, lng: 77.2090 };
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Connaught Place to IGI Airport, Delhi: roughly 14 km
        let cp = GeoPoint { lat: 28.6315, lng: 77.2167 };
        let igi = GeoPoint { lat: 28.5562, lng: 77.1000 };
        let d = haversine_km(cp, igi);
        assert!((13.0..18.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_symmetry() {
        let a = GeoPoint { lat: 12.9716, lng: 77.5946 };
        let b = GeoPoint { lat: 13.0827, lng: 80.2707 };
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }
}
