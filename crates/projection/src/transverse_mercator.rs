//! Transverse Mercator projection on the ellipsoid.
//!
//! Uses the Krüger series to sixth order in the third flattening n, which
//! is accurate to well under a millimeter within the usual UTM zone width
//! and remains usable several thousand kilometers from the central meridian.
//!
//! The projection parameters include:
//! - Central meridian (lon0)
//! - Scale factor on the central meridian (k0)
//! - False easting and false northing

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, ProjectionResult};
use crate::geographic::{
    check_finite, check_geographic, normalize_longitude, normalize_longitude_deg,
};

const NAME: &str = "Transverse Mercator";

/// Maximum Newton iterations when recovering latitude from conformal latitude.
const MAX_ITERATIONS: usize = 10;

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// First eccentricity
    e: f64,
    /// Rectifying radius A
    radius: f64,
    /// Forward series coefficients α1..α6
    alpha: [f64; 6],
    /// Inverse series coefficients β1..β6
    beta: [f64; 6],
}

impl TransverseMercator {
    /// Create a Transverse Mercator projection.
    ///
    /// # Arguments
    /// * `ellipsoid` - Reference ellipsoid
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `k0` - Scale factor on the central meridian
    /// * `false_easting` - False easting (meters)
    /// * `false_northing` - False northing (meters)
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.third_flattening();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let radius = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1983433.0 * n6 / 1935360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167603.0 * n6 / 181440.0,
            49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0 + 6601661.0 * n6 / 7257600.0,
            34729.0 * n5 / 80640.0 - 3418889.0 * n6 / 1995840.0,
            212378941.0 * n6 / 319334400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1118711.0 * n6 / 3870720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0 - 830251.0 * n6 / 7257600.0,
            4583.0 * n5 / 161280.0 - 108847.0 * n6 / 3991680.0,
            20648693.0 * n6 / 638668800.0,
        ];

        Self {
            lon0: lon0_deg,
            k0,
            false_easting,
            false_northing,
            e: ellipsoid.e(),
            radius,
            alpha,
            beta,
        }
    }

    /// Create a UTM zone projection.
    ///
    /// Zones are numbered 1..=60 eastward from 180°W, each 6° wide. The
    /// southern hemisphere uses a false northing of 10,000 km.
    pub fn utm(ellipsoid: Ellipsoid, zone: u8, south: bool) -> Self {
        let lon0 = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if south { 10_000_000.0 } else { 0.0 };
        Self::new(ellipsoid, lon0, 0.9996, 500_000.0, false_northing)
    }

    /// Conformal latitude tangent τ' for a geodetic latitude tangent τ.
    fn conformal_tan(&self, tau: f64) -> f64 {
        let e = self.e;
        let tau1 = (1.0 + tau * tau).sqrt();
        let sigma = (e * (e * tau / tau1).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * tau1
    }

    /// Project longitude/latitude in degrees to (easting, northing) meters.
    pub fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        check_geographic(NAME, lon, lat)?;

        let lambda = normalize_longitude((lon - self.lon0).to_radians());
        if lambda.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::out_of_domain(NAME, lon, lat));
        }

        let tau = lat.to_radians().tan();
        let tau_p = self.conformal_tan(tau);
        let cos_lambda = lambda.cos();

        let xi_p = tau_p.atan2(cos_lambda);
        let eta_p = (lambda.sin() / (tau_p * tau_p + cos_lambda * cos_lambda).sqrt()).asinh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let x = self.false_easting + self.k0 * self.radius * eta;
        let y = self.false_northing + self.k0 * self.radius * xi;
        check_finite(NAME, x, y)
    }

    /// Unproject (easting, northing) meters to longitude/latitude in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::out_of_domain(NAME, x, y));
        }

        let xi = (y - self.false_northing) / (self.k0 * self.radius);
        let eta = (x - self.false_easting) / (self.k0 * self.radius);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_p.sinh();
        let cos_xi = xi_p.cos();
        let tau_p = xi_p.sin() / (sinh_eta * sinh_eta + cos_xi * cos_xi).sqrt();
        let lambda = sinh_eta.atan2(cos_xi);

        // Newton iteration for τ given τ'
        let e2 = self.e * self.e;
        let mut tau = tau_p;
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let tau_i = self.conformal_tan(tau);
            let delta = (tau_p - tau_i) / (1.0 + tau_i * tau_i).sqrt()
                * (1.0 + (1.0 - e2) * tau * tau)
                / ((1.0 - e2) * (1.0 + tau * tau).sqrt());
            tau += delta;
            if !tau.is_finite() {
                break;
            }
            if delta.abs() <= 1e-12 * tau.abs().max(1.0) {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(ProjectionError::DidNotConverge {
                projection: NAME,
                x,
                y,
            });
        }

        let lon = normalize_longitude_deg(self.lon0 + lambda.to_degrees());
        let lat = tau.atan().to_degrees();
        check_finite(NAME, lon, lat)
    }
}
