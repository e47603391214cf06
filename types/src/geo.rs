//! Geolocation for biometric capture points and signing devices.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A GPS coordinate with optional reported accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
    /// Reported accuracy radius in meters, if the capture device provides one.
    pub accuracy_m: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
        }
    }

    pub fn with_accuracy(latitude: f64, longitude: f64, accuracy_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: Some(accuracy_m),
        }
    }

    /// Great-circle distance to another point in kilometers (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(5.6037, -0.1870);
        assert!(p.distance_km(&p) < 1e-9);
    }

    #[test]
    fn accra_to_kumasi_roughly_200km() {
        let accra = GeoPoint::new(5.6037, -0.1870);
        let kumasi = GeoPoint::new(6.6885, -1.6244);
        let d = accra.distance_km(&kumasi);
        assert!((190.0..220.0).contains(&d), "got {d} km");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(5.6037, -0.1870);
        let b = GeoPoint::new(9.4034, -0.8424);
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
    }
}
