//! Lambert Conformal Conic projection on the ellipsoid.
//!
//! It maps a cone tangent or secant to the Earth's surface onto a flat plane.
//! National grids such as the French Lambert-93 (EPSG:2154) use it.
//!
//! The projection parameters include:
//! - Latitude of false origin (lat0)
//! - Longitude of false origin (lon0): the central meridian
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//! - False easting and false northing

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, ProjectionResult};
use crate::geographic::{
    check_finite, check_geographic, normalize_longitude, normalize_longitude_deg,
};

const NAME: &str = "Lambert Conformal Conic";

/// Maximum fixed-point iterations for the inverse latitude.
const MAX_ITERATIONS: usize = 15;

/// Lambert Conformal Conic projection parameters.
///
/// These parameters define the projection from geographic (lon/lat) to
/// projected (easting, northing) coordinates and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of false origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Semi-major axis (meters)
    a: f64,
    /// First eccentricity
    e: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of false origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a Lambert Conformal projection from its defining parameters.
    ///
    /// # Arguments
    /// * `ellipsoid` - Reference ellipsoid
    /// * `lat0_deg` - Latitude of false origin (degrees)
    /// * `lon0_deg` - Longitude of false origin / central meridian (degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees)
    /// * `false_easting` - False easting (meters)
    /// * `false_northing` - False northing (meters)
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        let a = ellipsoid.a;
        let e = ellipsoid.e();

        let m1 = m(e, latin1);
        let t1 = t(e, latin1);

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            (m1.ln() - m(e, latin2).ln()) / (t1.ln() - t(e, latin2).ln())
        };

        // Compute F constant
        let f = m1 / (n * t1.powf(n));

        // Compute rho at the latitude of false origin
        let rho0 = a * f * t(e, lat0).powf(n);

        Self {
            lon0,
            lat0,
            latin1,
            latin2,
            false_easting,
            false_northing,
            a,
            e,
            n,
            f,
            rho0,
        }
    }

    /// Create the RGF93 / Lambert-93 projection (EPSG:2154).
    ///
    /// Lambert-93 uses:
    /// - Ellipsoid: GRS80
    /// - Standard parallels: 49°N and 44°N
    /// - False origin: 46.5°N, 3°E at (700000, 6600000)
    pub fn lambert93() -> Self {
        Self::new(
            Ellipsoid::GRS80,
            46.5,        // lat0
            3.0,         // lon0
            49.0,        // latin1
            44.0,        // latin2
            700_000.0,   // false easting
            6_600_000.0, // false northing
        )
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Project longitude/latitude in degrees to (easting, northing) meters.
    pub fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        check_geographic(NAME, lon, lat)?;

        let phi = lat.to_radians();
        // The apex of the cone maps to a point; the opposite pole to infinity.
        if (phi.abs() - FRAC_PI_2).abs() < 1e-12 && phi.signum() != self.n.signum() {
            return Err(ProjectionError::out_of_domain(NAME, lon, lat));
        }

        // Normalize longitude difference to [-π, π]
        let dlon = normalize_longitude(lon.to_radians() - self.lon0);

        // Compute rho for this latitude
        let rho = self.a * self.f * t(self.e, phi).powf(self.n);

        // Compute theta (angle from central meridian)
        let theta = self.n * dlon;

        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();
        check_finite(NAME, x, y)
    }

    /// Unproject (easting, northing) meters to longitude/latitude in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::out_of_domain(NAME, x, y));
        }

        let mut dx = x - self.false_easting;
        let mut dy = self.rho0 - (y - self.false_northing);

        // Compute rho and theta from x, y
        let rho = dx.hypot(dy).copysign(self.n);
        if self.n < 0.0 {
            dx = -dx;
            dy = -dy;
        }
        let theta = dx.atan2(dy);

        let lon = normalize_longitude_deg((self.lon0 + theta / self.n).to_degrees());

        if rho == 0.0 {
            return Ok((lon, 90.0_f64.copysign(self.n)));
        }

        // Iterate for latitude from the isometric quantity t
        let t_val = (rho / (self.a * self.f)).powf(1.0 / self.n);
        let half_e = self.e / 2.0;
        let mut phi = FRAC_PI_2 - 2.0 * t_val.atan();
        for _ in 0..MAX_ITERATIONS {
            let es = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t_val * ((1.0 - es) / (1.0 + es)).powf(half_e)).atan();
            let delta = (next - phi).abs();
            phi = next;
            if delta < 1e-14 {
                return check_finite(NAME, lon, phi.to_degrees());
            }
        }

        Err(ProjectionError::DidNotConverge {
            projection: NAME,
            x,
            y,
        })
    }
}

/// m(φ) = cos φ / sqrt(1 - e² sin² φ)
fn m(e: f64, phi: f64) -> f64 {
    let es = e * phi.sin();
    phi.cos() / (1.0 - es * es).sqrt()
}

/// t(φ) = tan(π/4 - φ/2) / ((1 - e sin φ) / (1 + e sin φ))^(e/2)
fn t(e: f64, phi: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambert93_false_origin() {
        let proj = LambertConformal::lambert93();

        // False origin should map to (700000, 6600000)
        let (x, y) = proj.forward(3.0, 46.5).unwrap();
        assert!((x - 700000.0).abs() < 1e-6, "x should be 700000, got {}", x);
        assert!((y - 6600000.0).abs() < 1e-6, "y should be 6600000, got {}", y);
    }

    #[test]
    fn test_lambert93_paris() {
        let proj = LambertConformal::lambert93();
        let (x, y) = proj.forward(2.3522, 48.8566).unwrap();

        println!("Paris Lambert-93: x={:.2}, y={:.2}", x, y);

        assert!((x - 652469.02).abs() < 0.01, "x was {}", x);
        assert!((y - 6862035.26).abs() < 0.01, "y was {}", y);
    }

    #[test]
    fn test_lambert93_roundtrip() {
        let proj = LambertConformal::lambert93();

        for &(lon, lat) in &[(-1.5, 43.2), (7.75, 48.58), (2.3522, 48.8566), (9.45, 42.7)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon roundtrip failed: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat roundtrip failed: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_tangent_cone() {
        let proj = LambertConformal::new(Ellipsoid::WGS84, 38.5, -97.5, 38.5, 38.5, 0.0, 0.0);
        assert!((proj.cone_constant() - 38.5_f64.to_radians().sin()).abs() < 1e-12);

        let (x, y) = proj.forward(-94.5, 39.0).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - -94.5).abs() < 1e-9, "lon roundtrip failed: {}", lon);
        assert!((lat - 39.0).abs() < 1e-9, "lat roundtrip failed: {}", lat);
    }

    #[test]
    fn test_opposite_pole_rejected() {
        let proj = LambertConformal::lambert93();
        assert!(proj.forward(3.0, -90.0).is_err());
    }
}
