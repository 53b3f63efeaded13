//! Reference ellipsoids.

/// An ellipsoid of revolution defined by its semi-major axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub a: f64,
    /// Inverse flattening (1/f)
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// WGS 84 (EPSG:7030)
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        inverse_flattening: 298.257223563,
    };

    /// GRS 1980 (EPSG:7019), used by ETRS89, NAD83 and RGF93
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        inverse_flattening: 298.257222101,
    };

    /// Flattening f.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// First eccentricity squared, e² = f(2 - f).
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// First eccentricity e.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Third flattening n = f / (2 - f).
    pub fn third_flattening(&self) -> f64 {
        let f = self.flattening();
        f / (2.0 - f)
    }
}
