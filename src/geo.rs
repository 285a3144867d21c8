use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

/// Mean earth radius used for route distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6373.0;

/// A position on the globe in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Great-circle distance in kilometers between two lon/lat pairs given in degrees.
///
/// Uses the haversine formula. The haversine term is clamped to `[0, 1]` so
/// antipodal points cannot push `asin` outside its domain through rounding.
pub fn distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Result<f64> {
    for (name, value) in [("lon1", lon1), ("lat1", lat1), ("lon2", lon2), ("lat2", lat2)] {
        if !value.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "{name} must be finite, got {value}"
            )));
        }
    }
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    let half_dlat = ((lat2 - lat1) / 2.0).sin();
    let half_dlon = ((lon2 - lon1) / 2.0).sin();
    let a = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;
    let a = a.clamp(0.0, 1.0);
    Ok(2.0 * EARTH_RADIUS_KM * a.sqrt().asin())
}

pub fn great_circle_distance(a: GeoPoint, b: GeoPoint) -> Result<f64> {
    distance(a.lon, a.lat, b.lon, b.lat)
}

/// Total length of a path visiting `points` in order. Fewer than two points is a zero-length tour.
pub fn tour_length(points: &[GeoPoint]) -> Result<f64> {
    let mut total = 0.0;
    for pair in points.windows(2) {
        total += great_circle_distance(pair[0], pair[1])?;
    }
    Ok(total)
}
