//! Fixtures and helpers shared by the reprojection crates' tests.
//!
//! `fixtures` holds hand-written GeoJSON cases with known answers (UTM
//! survey lines, a polygon with a hole, 3D and mixed-arity features, an
//! unrecognized geometry kind). `generators` builds larger inputs such as
//! closed rings and collections of many features. The macros compare
//! floating-point values and coordinates within a tolerance.
//!
//! Pulled in as a dev-dependency:
//!
//! ```ignore
//! use test_utils::{crs, utm_line, assert_coords_approx_eq};
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert that two numbers differ by at most `epsilon`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: {} and {} differ by {:e} (tolerance {:e})",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that two positions agree within `epsilon` on x and y.
///
/// Takes either `(x, y)` tuples or two `Coordinate` values. Elevation is
/// not compared.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: $crate::Coordinate = $left;
        let right: $crate::Coordinate = $right;
        $crate::assert_approx_eq!(left.x, right.x, $epsilon);
        $crate::assert_approx_eq!(left.y, right.y, $epsilon);
    }};
}

/// Collect every position of a geometry in document order.
pub fn coordinates_of(geometry: &reproject_common::Geometry) -> Vec<reproject_common::Coordinate> {
    let mut coords = Vec::with_capacity(geometry.vertex_count());
    geometry.for_each_coordinate(&mut |c| coords.push(*c));
    coords
}

pub use reproject_common::Coordinate;
