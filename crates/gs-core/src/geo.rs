//! Geographic coordinate type.
//!
//! `GeoPoint` uses `f64` (double-precision) longitude/latitude.  The feeder
//! weld step perturbs coordinates by 1e-6°, which is below single-precision
//! resolution at typical longitudes, so `f32` is not an option here.

use serde::{Deserialize, Serialize};

use crate::units::Distance;

/// Mean Earth radius of the WGS-84 ellipsoid, metres.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS-84 geographic coordinate.  Constructor order is `(lon, lat)`
/// throughout the framework.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle (haversine) distance to `other`.
    ///
    /// Accuracy is within ~0.5 % of the ellipsoidal distance — sufficient for
    /// conductor sizing and feeder-length accounting at city scale.
    pub fn distance(self, other: GeoPoint) -> Distance {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::meters(EARTH_RADIUS_M * c)
    }

    /// Squared Euclidean distance in lon/lat degree space — cheap comparison
    /// key for nearest-site queries within a city (error < 0.1 % at ≤ 60° lat).
    #[inline]
    pub fn planar_distance_sq(self, other: GeoPoint) -> f64 {
        let d_lon = self.lon - other.lon;
        let d_lat = self.lat - other.lat;
        d_lon * d_lon + d_lat * d_lat
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}
