//! Geocoding boundary and great-circle distance.

use std::collections::HashMap;

use domain::{Coordinates, ShippingAddress};
use sha2::{Digest, Sha256};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude range produced by [`HashGeocoder`] (continental US).
pub const LATITUDE_RANGE: (f64, f64) = (25.0, 49.0);

/// Longitude range produced by [`HashGeocoder`] (continental US).
pub const LONGITUDE_RANGE: (f64, f64) = (-125.0, -67.0);

/// Great-circle distance in kilometers between two points, using the
/// haversine formula.
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Converts a shipping address to coordinates.
///
/// Implementations must be deterministic: the same address always yields the
/// same coordinates.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &ShippingAddress) -> Coordinates;
}

/// Hash-based stand-in for a real geocoding service.
///
/// The lower-cased formatted address is hashed with SHA-256; the first four
/// bytes pick a latitude and the next four a longitude within the continental
/// US ranges, rounded to six decimal places.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashGeocoder;

impl HashGeocoder {
    pub fn new() -> Self {
        Self
    }

    fn scale(bits: u32, (low, high): (f64, f64)) -> f64 {
        let value = low + (f64::from(bits) / f64::from(u32::MAX)) * (high - low);
        (value * 1e6).round() / 1e6
    }
}

impl Geocoder for HashGeocoder {
    fn geocode(&self, address: &ShippingAddress) -> Coordinates {
        let digest = Sha256::digest(address.formatted().to_lowercase().as_bytes());
        let lat_bits = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        let lng_bits = u32::from_be_bytes([digest[4], digest[5], digest[6], digest[7]]);

        Coordinates::new(
            Self::scale(lat_bits, LATITUDE_RANGE),
            Self::scale(lng_bits, LONGITUDE_RANGE),
        )
    }
}

/// Geocoder with fixed coordinates for known addresses, falling back to
/// [`HashGeocoder`] for everything else.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    known: HashMap<String, Coordinates>,
    fallback: HashGeocoder,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins `address` to `location`.
    pub fn with(mut self, address: &ShippingAddress, location: Coordinates) -> Self {
        self.known
            .insert(address.formatted().to_lowercase(), location);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &ShippingAddress) -> Coordinates {
        self.known
            .get(&address.formatted().to_lowercase())
            .copied()
            .unwrap_or_else(|| self.fallback.geocode(address))
    }
}
