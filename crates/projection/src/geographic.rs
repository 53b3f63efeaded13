//! Shared helpers for geographic (longitude/latitude) coordinates.

use std::f64::consts::PI;

use crate::error::{ProjectionError, ProjectionResult};

/// Wrap a longitude difference in radians to [-π, π].
///
/// Values already in range are returned unchanged.
pub fn normalize_longitude(dlon: f64) -> f64 {
    if (-PI..=PI).contains(&dlon) || !dlon.is_finite() {
        return dlon;
    }
    (dlon + PI).rem_euclid(2.0 * PI) - PI
}

/// Wrap a longitude in degrees to [-180, 180].
///
/// Values already in range are returned unchanged.
pub fn normalize_longitude_deg(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) || !lon.is_finite() {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Reject geographic input a forward projection cannot accept.
///
/// Latitude must lie in [-90, 90]; both components must be finite.
pub fn check_geographic(projection: &'static str, lon: f64, lat: f64) -> ProjectionResult<()> {
    if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
        return Err(ProjectionError::out_of_domain(projection, lon, lat));
    }
    Ok(())
}

/// Reject a projection result that is not a finite pair.
pub fn check_finite(projection: &'static str, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
    if x.is_finite() && y.is_finite() {
        Ok((x, y))
    } else {
        Err(ProjectionError::out_of_domain(projection, x, y))
    }
}
