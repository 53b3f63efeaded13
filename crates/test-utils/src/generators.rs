//! Generators for synthetic geometries and feature collections.
//!
//! These generators create predictable, verifiable inputs that can be used
//! across the test suite.

use std::f64::consts::PI;

use reproject_common::{Coordinate, Feature, FeatureCollection, Geometry};
use serde_json::json;

/// Creates a closed ring of `vertices` distinct positions on a circle.
///
/// The returned ring has `vertices + 1` positions; the last repeats the
/// first exactly.
///
/// # Example
///
/// ```
/// use reproject_common::Coordinate;
/// use test_utils::closed_ring;
///
/// let ring = closed_ring(Coordinate::new(0.0, 0.0), 10.0, 6);
/// assert_eq!(ring.len(), 7);
/// assert_eq!(ring.first(), ring.last());
/// ```
pub fn closed_ring(center: Coordinate, radius: f64, vertices: usize) -> Vec<Coordinate> {
    let mut ring: Vec<Coordinate> = (0..vertices)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / vertices as f64;
            Coordinate::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Creates a single-ring polygon from [`closed_ring`].
pub fn closed_ring_polygon(center: Coordinate, radius: f64, vertices: usize) -> Geometry {
    Geometry::polygon(vec![closed_ring(center, radius, vertices)])
}

/// Creates a 3D LineString whose elevation increases by 1 per vertex.
pub fn elevated_line(start: Coordinate, step: f64, vertices: usize) -> Geometry {
    Geometry::line_string(
        (0..vertices)
            .map(|i| {
                let offset = step * i as f64;
                Coordinate::new_3d(start.x + offset, start.y + offset, i as f64)
            })
            .collect(),
    )
}

/// Creates a collection of `count` point features laid out on a row.
///
/// Feature `i` sits at `origin + (i * spacing, 0)` and carries
/// `{"seq": i}` as its properties.
pub fn point_collection(origin: Coordinate, spacing: f64, count: usize) -> FeatureCollection {
    let features = (0..count)
        .map(|i| {
            Feature::new(Geometry::point(Coordinate::new(
                origin.x + spacing * i as f64,
                origin.y,
            )))
            .with_properties(json!({ "seq": i }))
        })
        .collect();
    FeatureCollection::new().with_features(features)
}

/// Creates a collection of `count` polygon features around `origin`.
pub fn polygon_collection(origin: Coordinate, radius: f64, count: usize) -> FeatureCollection {
    let features = (0..count)
        .map(|i| {
            let center = Coordinate::new(origin.x + 3.0 * radius * i as f64, origin.y);
            Feature::new(closed_ring_polygon(center, radius, 8)).with_id(format!("poly-{}", i))
        })
        .collect();
    FeatureCollection::new().with_features(features)
}
