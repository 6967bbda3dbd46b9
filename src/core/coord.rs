//! Coordinates and great-circle distance
//!
//! Distances are computed with the haversine formula on a sphere whose radius
//! is expressed in nautical miles, then converted to statute miles and feet.
//! Tolerances throughout the crate are in feet.

use serde::{Deserialize, Serialize};

/// Earth radius in nautical miles
pub const EARTH_RADIUS_NMI: f64 = 3440.2769;

/// Statute miles per nautical mile
pub const MILES_PER_NMI: f64 = 1.15078;

/// Feet per statute mile
pub const FEET_PER_MILE: f64 = 5280.0;

/// A longitude/latitude position in degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Exact identity of this coordinate, usable as a hash key
    pub fn key(&self) -> CoordKey {
        CoordKey(self.lon.to_bits(), self.lat.to_bits())
    }
}

impl From<[f64; 2]> for Coord {
    fn from(position: [f64; 2]) -> Self {
        Self::new(position[0], position[1])
    }
}

/// Bit-exact identity of a [`Coord`]
///
/// Two coordinates share a key only when both components are bit-identical,
/// which is how the source layers repeat a dangle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(u64, u64);

/// Great-circle distance in statute miles between two coordinates
pub fn great_circle_miles(a: Coord, b: Coord) -> f64 {
    // convert each component before differencing
    let (lon1, lat1) = (a.lon.to_radians(), a.lat.to_radians());
    let (lon2, lat2) = (b.lon.to_radians(), b.lat.to_radians());
    let delta_lat = lat2 - lat1;
    let delta_lon = lon2 - lon1;

    let h =
        (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_NMI * c * MILES_PER_NMI
}

/// Great-circle distance in feet between two coordinates
pub fn great_circle_feet(a: Coord, b: Coord) -> f64 {
    great_circle_miles(a, b) * FEET_PER_MILE
}
