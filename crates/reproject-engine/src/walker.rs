//! Structure-preserving geometry traversal.
//!
//! A single recursive procedure maps every position of a geometry through
//! a caller-supplied function. The geometry kind fixes how deep the
//! coordinate tree must be; collections recurse into their members. The
//! output has the same kind, nesting and element counts as the input.

use reproject_common::{Coordinate, CoordinateTree, Geometry, GeometryError, GeometryKind};
use tracing::trace;

/// Receives events while a geometry is walked.
pub trait WalkObserver {
    fn geometry_started(&self, _geometry: &Geometry) {}

    fn vertex(&self, _before: &Coordinate, _after: &Coordinate) {}

    fn geometry_finished(&self, _geometry: &Geometry) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl WalkObserver for NoopObserver {}

/// Observer that emits `trace` events for each geometry and vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl WalkObserver for TracingObserver {
    fn geometry_started(&self, geometry: &Geometry) {
        trace!(kind = %geometry.kind, vertices = geometry.vertex_count(), "Walking geometry");
    }

    fn vertex(&self, before: &Coordinate, after: &Coordinate) {
        trace!(
            before_x = before.x,
            before_y = before.y,
            after_x = after.x,
            after_y = after.y,
            "Transformed vertex"
        );
    }

    fn geometry_finished(&self, geometry: &Geometry) {
        trace!(kind = %geometry.kind, "Finished geometry");
    }
}

/// Maps geometries through a coordinate function.
pub struct GeometryWalker<'a, O: WalkObserver + ?Sized = NoopObserver> {
    observer: &'a O,
    closure_tolerance: f64,
}

impl<'a, O: WalkObserver + ?Sized> GeometryWalker<'a, O> {
    pub fn new(observer: &'a O, closure_tolerance: f64) -> Self {
        Self {
            observer,
            closure_tolerance,
        }
    }

    /// Map every position of `geometry` through `f`.
    ///
    /// Positions are visited depth-first in document order.
    pub fn transform<F>(&self, geometry: &Geometry, f: &mut F) -> Result<Geometry, GeometryError>
    where
        F: FnMut(Coordinate) -> Result<Coordinate, GeometryError>,
    {
        self.observer.geometry_started(geometry);

        let output = match &geometry.kind {
            GeometryKind::Unrecognized(name) => {
                return Err(GeometryError::UnsupportedGeometryKind(name.clone()));
            }
            GeometryKind::GeometryCollection => {
                let members = geometry.geometries.as_ref().ok_or_else(|| {
                    GeometryError::malformed("GeometryCollection has no geometries member")
                })?;
                let members = members
                    .iter()
                    .map(|member| self.transform(member, f))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::collection(members)
            }
            kind => {
                let tree = geometry.coordinates.as_ref().ok_or_else(|| {
                    GeometryError::malformed(format!("{} geometry has no coordinates", kind))
                })?;
                // Every recognized non-collection kind has a depth.
                let depth = kind.coordinate_depth().unwrap_or(0);
                let mut walk = TreeWalk {
                    kind,
                    ring_level: kind.ring_level(),
                    closure_tolerance: self.closure_tolerance,
                    observer: self.observer,
                    ring_index: 0,
                };
                let mapped = walk.map(tree, depth, 0, f)?;
                Geometry::new(kind.clone(), mapped)
            }
        };

        self.observer.geometry_finished(&output);
        Ok(output)
    }
}

struct TreeWalk<'k, 'o, O: WalkObserver + ?Sized> {
    kind: &'k GeometryKind,
    ring_level: Option<usize>,
    closure_tolerance: f64,
    observer: &'o O,
    ring_index: usize,
}

impl<O: WalkObserver + ?Sized> TreeWalk<'_, '_, O> {
    fn map<F>(
        &mut self,
        tree: &CoordinateTree,
        remaining: usize,
        level: usize,
        f: &mut F,
    ) -> Result<CoordinateTree, GeometryError>
    where
        F: FnMut(Coordinate) -> Result<Coordinate, GeometryError>,
    {
        match (tree, remaining) {
            (CoordinateTree::Leaf(coord), 0) => {
                let mapped = f(*coord)?;
                self.observer.vertex(coord, &mapped);
                Ok(CoordinateTree::Leaf(mapped))
            }
            (CoordinateTree::Nested(children), remaining) if remaining > 0 => {
                let mapped = children
                    .iter()
                    .map(|child| self.map(child, remaining - 1, level + 1, f))
                    .collect::<Result<Vec<_>, _>>()?;
                if self.ring_level == Some(level) {
                    self.check_ring(children, &mapped)?;
                }
                Ok(CoordinateTree::Nested(mapped))
            }
            // An empty Point
            (CoordinateTree::Nested(children), 0) if level == 0 && children.is_empty() => {
                Ok(CoordinateTree::Nested(Vec::new()))
            }
            _ => Err(GeometryError::malformed(format!(
                "{} coordinates are not nested {} levels deep",
                self.kind,
                self.kind.coordinate_depth().unwrap_or(0)
            ))),
        }
    }

    /// A ring closed on input must still be closed on output.
    fn check_ring(
        &mut self,
        input: &[CoordinateTree],
        output: &[CoordinateTree],
    ) -> Result<(), GeometryError> {
        let ring = self.ring_index;
        self.ring_index += 1;

        let ends = |coords: &[CoordinateTree]| match (coords.first(), coords.last()) {
            (Some(CoordinateTree::Leaf(first)), Some(CoordinateTree::Leaf(last)))
                if coords.len() > 1 =>
            {
                Some((*first, *last))
            }
            _ => None,
        };

        let closed_on_input = matches!(
            ends(input),
            Some((first, last)) if first.planar_distance_max(&last) == 0.0
        );
        if !closed_on_input {
            return Ok(());
        }

        if let Some((first, last)) = ends(output) {
            let gap = first.planar_distance_max(&last);
            if gap > self.closure_tolerance {
                return Err(GeometryError::RingClosure { ring, gap });
            }
        }
        Ok(())
    }
}

/// Map every position of `geometry` through `f` without observation.
pub fn transform<F>(geometry: &Geometry, mut f: F) -> Result<Geometry, GeometryError>
where
    F: FnMut(Coordinate) -> Result<Coordinate, GeometryError>,
{
    GeometryWalker::new(&NoopObserver, 0.0).transform(geometry, &mut f)
}

/// Fail with `UnsupportedGeometryKind` if any kind in `geometry` is unrecognized.
pub fn ensure_supported(geometry: &Geometry) -> Result<(), GeometryError> {
    if let GeometryKind::Unrecognized(name) = &geometry.kind {
        return Err(GeometryError::UnsupportedGeometryKind(name.clone()));
    }
    geometry.geometries.iter().flatten().try_for_each(ensure_supported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn geometry(value: serde_json::Value) -> Geometry {
        serde_json::from_value(value).unwrap()
    }

    fn shift(c: Coordinate) -> Result<Coordinate, GeometryError> {
        Ok(Coordinate::new(c.x + 10.0, c.y - 1.0))
    }

    #[test]
    fn test_every_kind_keeps_shape() {
        let inputs = [
            json!({"type": "Point", "coordinates": [1, 2]}),
            json!({"type": "MultiPoint", "coordinates": [[1, 2], [3, 4]]}),
            json!({"type": "LineString", "coordinates": [[1, 2], [3, 4], [5, 6]]}),
            json!({"type": "MultiLineString", "coordinates": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]]}),
            json!({"type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 4], [0, 0]], [[1, 1], [2, 1], [2, 2], [1, 1]]]}),
            json!({"type": "MultiPolygon", "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]], [[[5, 5], [6, 5], [6, 6], [5, 5]]]]}),
            json!({"type": "GeometryCollection", "geometries": [
                {"type": "Point", "coordinates": [1, 2]},
                {"type": "LineString", "coordinates": [[1, 2], [3, 4]]}
            ]}),
        ];

        for input in inputs {
            let input = geometry(input);
            let output = transform(&input, shift).unwrap();
            assert!(input.same_shape(&output), "shape changed for {}", input.kind);
            assert_eq!(input.vertex_count(), output.vertex_count());
        }
    }

    #[test]
    fn test_point_value() {
        let output = transform(&Geometry::point(Coordinate::new(1.0, 2.0)), shift).unwrap();
        assert_eq!(output, Geometry::point(Coordinate::new(11.0, 1.0)));
    }

    #[test]
    fn test_empty_sequences() {
        let empty_line = geometry(json!({"type": "LineString", "coordinates": []}));
        assert_eq!(transform(&empty_line, shift).unwrap(), empty_line);

        let empty_collection = geometry(json!({"type": "GeometryCollection", "geometries": []}));
        assert_eq!(transform(&empty_collection, shift).unwrap(), empty_collection);

        let empty_point = geometry(json!({"type": "Point", "coordinates": []}));
        assert_eq!(transform(&empty_point, shift).unwrap(), empty_point);

        let empty_position = geometry(json!({"type": "LineString", "coordinates": [[]]}));
        assert!(matches!(
            transform(&empty_position, shift),
            Err(GeometryError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_unrecognized_kind_fails() {
        let curve = geometry(json!({"type": "CircularString", "coordinates": [[0, 0], [1, 1], [2, 0]]}));
        assert_eq!(
            transform(&curve, shift).unwrap_err(),
            GeometryError::UnsupportedGeometryKind("CircularString".to_string())
        );

        let nested = Geometry::collection(vec![Geometry::point(Coordinate::new(0.0, 0.0)), curve]);
        assert!(matches!(
            transform(&nested, shift),
            Err(GeometryError::UnsupportedGeometryKind(_))
        ));
        assert!(ensure_supported(&nested).is_err());
    }

    #[test]
    fn test_depth_mismatch_is_malformed() {
        let flat_polygon = geometry(json!({"type": "Polygon", "coordinates": [[0, 0], [1, 0], [0, 0]]}));
        assert!(matches!(
            transform(&flat_polygon, shift),
            Err(GeometryError::MalformedInput(_))
        ));

        let nested_point = geometry(json!({"type": "Point", "coordinates": [[1, 2]]}));
        assert!(matches!(
            transform(&nested_point, shift),
            Err(GeometryError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_missing_members_are_malformed() {
        let no_coords = geometry(json!({"type": "LineString"}));
        assert!(matches!(
            transform(&no_coords, shift),
            Err(GeometryError::MalformedInput(_))
        ));

        let no_members = geometry(json!({"type": "GeometryCollection"}));
        assert!(matches!(
            transform(&no_members, shift),
            Err(GeometryError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_function_error_propagates() {
        let line = Geometry::line_string(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]);
        let err = transform(&line, |_| Err(GeometryError::projection("boom"))).unwrap_err();
        assert_eq!(err, GeometryError::Projection("boom".to_string()));
    }

    #[test]
    fn test_ring_closure_violation() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ];
        let polygon = Geometry::polygon(vec![ring]);

        // Maps the same input position to different outputs.
        let mut calls = 0;
        let err = transform(&polygon, |c| {
            calls += 1;
            Ok(Coordinate::new(c.x + calls as f64, c.y))
        })
        .unwrap_err();
        assert!(matches!(err, GeometryError::RingClosure { ring: 0, .. }));
    }

    #[test]
    fn test_open_ring_left_alone() {
        let open = Geometry::polygon(vec![vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ]]);
        let mut calls = 0;
        let output = transform(&open, |c| {
            calls += 1;
            Ok(Coordinate::new(c.x + calls as f64, c.y))
        })
        .unwrap();
        assert_eq!(output.vertex_count(), 3);
    }

    #[derive(Default)]
    struct Recorder {
        vertices: RefCell<Vec<(Coordinate, Coordinate)>>,
        geometries: RefCell<usize>,
    }

    impl WalkObserver for Recorder {
        fn geometry_started(&self, _geometry: &Geometry) {
            *self.geometries.borrow_mut() += 1;
        }

        fn vertex(&self, before: &Coordinate, after: &Coordinate) {
            self.vertices.borrow_mut().push((*before, *after));
        }
    }

    #[test]
    fn test_observer_sees_document_order() {
        let recorder = Recorder::default();
        let walker = GeometryWalker::new(&recorder, 0.0);
        let line = Geometry::line_string(vec![
            Coordinate::new(1.0, 1.0),
            Coordinate::new(2.0, 2.0),
            Coordinate::new(3.0, 3.0),
        ]);
        let collection = Geometry::collection(vec![line, Geometry::point(Coordinate::new(9.0, 9.0))]);

        walker.transform(&collection, &mut shift).unwrap();

        let before: Vec<f64> = recorder.vertices.borrow().iter().map(|(b, _)| b.x).collect();
        assert_eq!(before, vec![1.0, 2.0, 3.0, 9.0]);
        assert_eq!(recorder.vertices.borrow()[0].1, Coordinate::new(11.0, 0.0));
        assert_eq!(*recorder.geometries.borrow(), 3);
    }
}
