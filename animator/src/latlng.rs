use std::fmt;

use geom::{Distance, LonLat};
use serde::{Deserialize, Serialize};

/// A geographic point in degrees. Unlike `LonLat`, the values are never rounded, so
/// interpolated positions stay continuous across frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance, matching what map widgets report between two markers.
    pub fn dist_to(self, other: LatLng) -> Distance {
        self.to_lon_lat().gps_dist(other.to_lon_lat())
    }

    /// Linear in coordinate space. `percent` is clamped to [0, 1], so an elapsed time a
    /// little past the end of a segment never overshoots.
    pub fn lerp(self, other: LatLng, percent: f64) -> LatLng {
        let k = percent.clamp(0.0, 1.0);
        LatLng::new(
            self.lat + k * (other.lat - self.lat),
            self.lng + k * (other.lng - self.lng),
        )
    }

    /// True if both coordinates are within `epsilon` degrees.
    pub fn approx_eq(self, other: LatLng, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lng - other.lng).abs() <= epsilon
    }

    pub fn to_lon_lat(self) -> LonLat {
        LonLat::new(self.lng, self.lat)
    }
}

impl From<LonLat> for LatLng {
    fn from(gps: LonLat) -> Self {
        Self::new(gps.y(), gps.x())
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}
