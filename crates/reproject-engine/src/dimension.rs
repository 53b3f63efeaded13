//! Dimension normalization.
//!
//! Projections work on planar (x, y) pairs. A 3D geometry has its
//! elevations split off before projection and re-attached afterwards
//! according to the configured [`ElevationPolicy`]. Elevation values are
//! never themselves reprojected.

use reproject_common::{Geometry, GeometryError};

use crate::config::ElevationPolicy;
use crate::walker;

/// A 2D geometry plus the elevations removed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry {
    /// Geometry with every position reduced to (x, y).
    pub geometry: Geometry,
    /// Elevations in traversal order, if the input was 3D.
    pub elevations: Option<Vec<f64>>,
}

impl NormalizedGeometry {
    pub fn had_z(&self) -> bool {
        self.elevations.is_some()
    }
}

/// Common arity of every position in `geometry`, members included.
///
/// Returns `None` for a geometry with no positions. Fails with
/// `InconsistentDimensionality` when 2D and 3D positions are mixed.
pub fn coordinate_arity(geometry: &Geometry) -> Result<Option<usize>, GeometryError> {
    let mut first: Option<usize> = None;
    let mut conflict: Option<usize> = None;

    geometry.for_each_coordinate(&mut |coord| {
        let arity = coord.arity();
        match first {
            None => first = Some(arity),
            Some(expected) if expected != arity && conflict.is_none() => conflict = Some(arity),
            Some(_) => {}
        }
    });

    match (first, conflict) {
        (Some(first), Some(second)) => Err(GeometryError::InconsistentDimensionality { first, second }),
        (first, None) => Ok(first),
        (None, Some(_)) => Ok(None),
    }
}

/// Split a geometry into its 2D form and recorded elevations.
pub fn normalize(geometry: Geometry) -> Result<NormalizedGeometry, GeometryError> {
    if coordinate_arity(&geometry)? != Some(3) {
        return Ok(NormalizedGeometry {
            geometry,
            elevations: None,
        });
    }

    let mut elevations = Vec::with_capacity(geometry.vertex_count());
    let flat = walker::transform(&geometry, |coord| {
        elevations.push(coord.z.unwrap_or_default());
        Ok(coord.to_2d())
    })?;

    Ok(NormalizedGeometry {
        geometry: flat,
        elevations: Some(elevations),
    })
}

/// Re-attach elevations to a transformed 2D geometry according to `policy`.
///
/// `elevations` must be the side table produced by [`normalize`] for the
/// same geometry; `None` means the input was 2D and the output stays 2D.
pub fn reattach_elevation(
    geometry: Geometry,
    elevations: Option<&[f64]>,
    policy: ElevationPolicy,
) -> Result<Geometry, GeometryError> {
    match (policy, elevations) {
        (ElevationPolicy::Drop, _) | (_, None) => Ok(geometry),
        (ElevationPolicy::Zero, Some(_)) => {
            walker::transform(&geometry, |coord| Ok(coord.with_z(Some(0.0))))
        }
        (ElevationPolicy::Preserve, Some(values)) => {
            let mut values = values.iter();
            let output = walker::transform(&geometry, |coord| {
                values
                    .next()
                    .map(|z| coord.with_z(Some(*z)))
                    .ok_or_else(|| GeometryError::malformed("fewer elevations than vertices"))
            })?;
            if values.next().is_some() {
                return Err(GeometryError::malformed("more elevations than vertices"));
            }
            Ok(output)
        }
    }
}

/// Reduce a geometry to 2D, failing on mixed arity.
pub fn strip_elevation(geometry: Geometry) -> Result<Geometry, GeometryError> {
    normalize(geometry).map(|normalized| normalized.geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reproject_common::Coordinate;
    use serde_json::json;

    fn geometry(value: serde_json::Value) -> Geometry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_2d_passes_through() {
        let line = geometry(json!({"type": "LineString", "coordinates": [[1, 2], [3, 4]]}));
        let normalized = normalize(line.clone()).unwrap();
        assert!(!normalized.had_z());
        assert_eq!(normalized.geometry, line);
    }

    #[test]
    fn test_3d_records_elevations_in_order() {
        let polygon = geometry(json!({"type": "Polygon", "coordinates": [
            [[0, 0, 10], [1, 0, 11], [1, 1, 12], [0, 0, 10]]
        ]}));
        let normalized = normalize(polygon).unwrap();
        assert_eq!(normalized.elevations, Some(vec![10.0, 11.0, 12.0, 10.0]));

        let mut arities = Vec::new();
        normalized
            .geometry
            .for_each_coordinate(&mut |c| arities.push(c.arity()));
        assert_eq!(arities, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_empty_geometry_is_valid() {
        let empty = geometry(json!({"type": "MultiPoint", "coordinates": []}));
        let normalized = normalize(empty.clone()).unwrap();
        assert!(!normalized.had_z());
        assert_eq!(normalized.geometry, empty);
    }

    #[test]
    fn test_mixed_arity_fails() {
        let line = geometry(json!({"type": "LineString", "coordinates": [[1, 2], [3, 4, 5]]}));
        assert_eq!(
            normalize(line).unwrap_err(),
            GeometryError::InconsistentDimensionality { first: 2, second: 3 }
        );
    }

    #[test]
    fn test_mixed_arity_across_collection_members() {
        let collection = Geometry::collection(vec![
            Geometry::point(Coordinate::new_3d(1.0, 2.0, 3.0)),
            Geometry::point(Coordinate::new(1.0, 2.0)),
        ]);
        assert!(matches!(
            coordinate_arity(&collection),
            Err(GeometryError::InconsistentDimensionality { first: 3, second: 2 })
        ));
    }

    #[test]
    fn test_reattach_policies() {
        let input = Geometry::line_string(vec![
            Coordinate::new_3d(1.0, 2.0, 100.0),
            Coordinate::new_3d(3.0, 4.0, 200.0),
        ]);
        let normalized = normalize(input).unwrap();
        let elevations = normalized.elevations.as_deref();

        let dropped =
            reattach_elevation(normalized.geometry.clone(), elevations, ElevationPolicy::Drop)
                .unwrap();
        dropped.for_each_coordinate(&mut |c| assert_eq!(c.z, None));

        let zeroed =
            reattach_elevation(normalized.geometry.clone(), elevations, ElevationPolicy::Zero)
                .unwrap();
        zeroed.for_each_coordinate(&mut |c| assert_eq!(c.z, Some(0.0)));

        let preserved = reattach_elevation(
            normalized.geometry.clone(),
            elevations,
            ElevationPolicy::Preserve,
        )
        .unwrap();
        let mut zs = Vec::new();
        preserved.for_each_coordinate(&mut |c| zs.push(c.z));
        assert_eq!(zs, vec![Some(100.0), Some(200.0)]);
    }

    #[test]
    fn test_reattach_on_2d_input_stays_2d() {
        let line = Geometry::line_string(vec![Coordinate::new(1.0, 2.0)]);
        let out = reattach_elevation(line.clone(), None, ElevationPolicy::Zero).unwrap();
        assert_eq!(out, line);
    }

    #[test]
    fn test_reattach_length_mismatch() {
        let line = Geometry::line_string(vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)]);
        assert!(reattach_elevation(line.clone(), Some(&[1.0]), ElevationPolicy::Preserve).is_err());
        assert!(
            reattach_elevation(line, Some(&[1.0, 2.0, 3.0]), ElevationPolicy::Preserve).is_err()
        );
    }
}
