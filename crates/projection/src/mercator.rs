//! Spherical ("Web") Mercator, EPSG:3857.
//!
//! Uses the WGS84 semi-major axis as the sphere radius, applied to WGS84
//! geodetic coordinates. The poles map to infinity and are rejected.

use std::f64::consts::PI;

use crate::error::{ProjectionError, ProjectionResult};
use crate::geographic::{check_finite, check_geographic, normalize_longitude};

const NAME: &str = "Web Mercator";

/// Spherical Mercator projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    /// Sphere radius in meters
    pub radius: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self { radius: 6378137.0 }
    }
}

impl WebMercator {
    /// Latitude limit of the square world extent used by tiled web maps.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

    /// Project longitude/latitude in degrees to (x, y) meters.
    pub fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        check_geographic(NAME, lon, lat)?;
        if lat.abs() >= 90.0 {
            return Err(ProjectionError::out_of_domain(NAME, lon, lat));
        }
        let lambda = normalize_longitude(lon.to_radians());
        let phi = lat.to_radians();
        let x = self.radius * lambda;
        let y = self.radius * (PI / 4.0 + phi / 2.0).tan().ln();
        check_finite(NAME, x, y)
    }

    /// Unproject (x, y) meters to longitude/latitude in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::out_of_domain(NAME, x, y));
        }
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - PI / 2.0).to_degrees();
        check_finite(NAME, lon, lat)
    }
}
