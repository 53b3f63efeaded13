//! GeoJSON geometry and feature model.
//!
//! Coordinates keep their arity (2D or 3D) exactly as received so that the
//! dimension normalizer can detect mixed input. Geometry payloads are stored
//! as a [`CoordinateTree`] whose nesting depth is dictated by the geometry
//! kind; unrecognized `type` strings are retained verbatim so they can be
//! reported by name instead of being rejected by the decoder.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConversionError, ConversionResult, GeometryError};

/// A single 2D or 3D position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Coordinate {
    /// Easting or longitude
    pub x: f64,
    /// Northing or latitude
    pub y: f64,
    /// Elevation, if the position is 3D
    pub z: Option<f64>,
}

impl Coordinate {
    /// Create a 2D coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Create a 3D coordinate.
    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Number of components (2 or 3).
    pub fn arity(&self) -> usize {
        if self.z.is_some() {
            3
        } else {
            2
        }
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// The planar part of this coordinate.
    pub fn to_2d(&self) -> Self {
        Self::new(self.x, self.y)
    }

    /// Same planar position with the given elevation.
    pub fn with_z(&self, z: Option<f64>) -> Self {
        Self { x: self.x, y: self.y, z }
    }

    /// Largest planar component difference to another coordinate.
    pub fn planar_distance_max(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(format!("coordinate contains a non-finite value: {:?}", values));
        }
        match values.as_slice() {
            [x, y] => Ok(Coordinate::new(*x, *y)),
            [x, y, z] => Ok(Coordinate::new_3d(*x, *y, *z)),
            _ => Err(format!(
                "coordinate must have 2 or 3 components, got {}",
                values.len()
            )),
        }
    }
}

impl From<Coordinate> for Vec<f64> {
    fn from(c: Coordinate) -> Self {
        match c.z {
            Some(z) => vec![c.x, c.y, z],
            None => vec![c.x, c.y],
        }
    }
}

/// Nested coordinate payload of a geometry.
///
/// A leaf is one position; every other level is an ordered list. The list
/// may be empty at any level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateTree {
    Leaf(Coordinate),
    Nested(Vec<CoordinateTree>),
}

impl CoordinateTree {
    /// Build a depth-1 tree from a list of positions.
    pub fn line(coords: Vec<Coordinate>) -> Self {
        CoordinateTree::Nested(coords.into_iter().map(CoordinateTree::Leaf).collect())
    }

    /// Build a depth-2 tree from a list of position lists.
    pub fn rings(rings: Vec<Vec<Coordinate>>) -> Self {
        CoordinateTree::Nested(rings.into_iter().map(CoordinateTree::line).collect())
    }

    /// Number of leaf positions.
    pub fn leaf_count(&self) -> usize {
        match self {
            CoordinateTree::Leaf(_) => 1,
            CoordinateTree::Nested(children) => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }

    /// Visit every leaf in document order.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a Coordinate)) {
        match self {
            CoordinateTree::Leaf(c) => f(c),
            CoordinateTree::Nested(children) => {
                for child in children {
                    child.for_each_leaf(f);
                }
            }
        }
    }

    /// Structural equality ignoring leaf values.
    pub fn same_shape(&self, other: &CoordinateTree) -> bool {
        match (self, other) {
            (CoordinateTree::Leaf(_), CoordinateTree::Leaf(_)) => true,
            (CoordinateTree::Nested(a), CoordinateTree::Nested(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            _ => false,
        }
    }
}

/// GeoJSON geometry type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    /// Any type string this crate does not recognize.
    Unrecognized(String),
}

impl GeometryKind {
    pub fn as_str(&self) -> &str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
            GeometryKind::Unrecognized(name) => name,
        }
    }

    /// Nesting depth of the coordinate payload for this kind.
    ///
    /// `None` for kinds that carry no coordinate array (collections) or that
    /// are not recognized.
    pub fn coordinate_depth(&self) -> Option<usize> {
        match self {
            GeometryKind::Point => Some(0),
            GeometryKind::MultiPoint | GeometryKind::LineString => Some(1),
            GeometryKind::MultiLineString | GeometryKind::Polygon => Some(2),
            GeometryKind::MultiPolygon => Some(3),
            GeometryKind::GeometryCollection | GeometryKind::Unrecognized(_) => None,
        }
    }

    /// Depth at which the tree holds closed rings, if any.
    ///
    /// Polygons hold rings one level below the root, multi-polygons two.
    pub fn ring_level(&self) -> Option<usize> {
        match self {
            GeometryKind::Polygon => Some(1),
            GeometryKind::MultiPolygon => Some(2),
            _ => None,
        }
    }
}

impl From<String> for GeometryKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Point" => GeometryKind::Point,
            "MultiPoint" => GeometryKind::MultiPoint,
            "LineString" => GeometryKind::LineString,
            "MultiLineString" => GeometryKind::MultiLineString,
            "Polygon" => GeometryKind::Polygon,
            "MultiPolygon" => GeometryKind::MultiPolygon,
            "GeometryCollection" => GeometryKind::GeometryCollection,
            _ => GeometryKind::Unrecognized(s),
        }
    }
}

impl From<GeometryKind> for String {
    fn from(kind: GeometryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Geometry type.
    #[serde(rename = "type")]
    pub kind: GeometryKind,

    /// Coordinate payload (absent for geometry collections).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinateTree>,

    /// Member geometries (geometry collections only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometries: Option<Vec<Geometry>>,
}

impl Geometry {
    /// Create a geometry of the given kind from its coordinate payload.
    pub fn new(kind: GeometryKind, coordinates: CoordinateTree) -> Self {
        Self {
            kind,
            coordinates: Some(coordinates),
            geometries: None,
        }
    }

    pub fn point(coord: Coordinate) -> Self {
        Self::new(GeometryKind::Point, CoordinateTree::Leaf(coord))
    }

    pub fn line_string(coords: Vec<Coordinate>) -> Self {
        Self::new(GeometryKind::LineString, CoordinateTree::line(coords))
    }

    pub fn polygon(rings: Vec<Vec<Coordinate>>) -> Self {
        Self::new(GeometryKind::Polygon, CoordinateTree::rings(rings))
    }

    pub fn multi_polygon(polygons: Vec<Vec<Vec<Coordinate>>>) -> Self {
        Self::new(
            GeometryKind::MultiPolygon,
            CoordinateTree::Nested(polygons.into_iter().map(CoordinateTree::rings).collect()),
        )
    }

    pub fn collection(geometries: Vec<Geometry>) -> Self {
        Self {
            kind: GeometryKind::GeometryCollection,
            coordinates: None,
            geometries: Some(geometries),
        }
    }

    /// Number of positions in this geometry, members included.
    pub fn vertex_count(&self) -> usize {
        let own = self.coordinates.as_ref().map_or(0, |c| c.leaf_count());
        let members: usize = self
            .geometries
            .iter()
            .flatten()
            .map(|g| g.vertex_count())
            .sum();
        own + members
    }

    /// Visit every position in document order, members included.
    pub fn for_each_coordinate<'a>(&'a self, f: &mut impl FnMut(&'a Coordinate)) {
        if let Some(tree) = &self.coordinates {
            tree.for_each_leaf(f);
        }
        for member in self.geometries.iter().flatten() {
            member.for_each_coordinate(f);
        }
    }

    /// Structural equality ignoring coordinate values.
    pub fn same_shape(&self, other: &Geometry) -> bool {
        if self.kind != other.kind {
            return false;
        }
        let coords_match = match (&self.coordinates, &other.coordinates) {
            (Some(a), Some(b)) => a.same_shape(b),
            (None, None) => true,
            _ => false,
        };
        let members_match = match (&self.geometries, &other.geometries) {
            (Some(a), Some(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (None, None) => true,
            _ => false,
        };
        coords_match && members_match
    }
}

/// A GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type", default = "feature_type")]
    pub type_: String,

    /// Optional feature identifier, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    /// The geometry; `None` when the member is null or missing.
    #[serde(default)]
    pub geometry: Option<Geometry>,

    /// Opaque properties, passed through untouched.
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl Feature {
    /// Create a feature with the given geometry and no properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: feature_type(),
            id: None,
            geometry: Some(geometry),
            properties: serde_json::Value::Null,
        }
    }

    /// Set the feature ID.
    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the properties.
    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }

    /// Same feature metadata with another geometry.
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            type_: self.type_.clone(),
            id: self.id.clone(),
            geometry: Some(geometry),
            properties: self.properties.clone(),
        }
    }
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type", default = "feature_collection_type")]
    pub type_: String,

    /// Array of features.
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: feature_collection_type(),
            features: Vec::new(),
        }
    }

    /// Add a feature to the collection.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Add multiple features to the collection.
    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Collection envelope with features left undecoded.
#[derive(Deserialize)]
struct RawFeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    type_: String,

    #[serde(default)]
    features: Vec<serde_json::Value>,
}

impl FeatureCollection {
    /// Decode a collection one feature at a time.
    ///
    /// A feature that does not decode is reported as `MalformedInput` with
    /// its index; a bad envelope is reported without one.
    pub fn from_json(value: serde_json::Value) -> ConversionResult<Self> {
        let raw: RawFeatureCollection = serde_json::from_value(value)
            .map_err(|err| ConversionError::malformed(format!("not a FeatureCollection: {}", err)))?;

        let features = raw
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| {
                serde_json::from_value::<Feature>(feature).map_err(|err| {
                    ConversionError::at_feature(GeometryError::malformed(err.to_string()), index)
                })
            })
            .collect::<ConversionResult<Vec<_>>>()?;

        Ok(Self {
            type_: raw.type_,
            features,
        })
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinate_arity() {
        let c: Coordinate = serde_json::from_value(json!([1.0, 2.0])).unwrap();
        assert_eq!(c.arity(), 2);
        let c: Coordinate = serde_json::from_value(json!([1.0, 2.0, 3.5])).unwrap();
        assert_eq!(c.z, Some(3.5));

        assert!(serde_json::from_value::<Coordinate>(json!([1.0])).is_err());
        assert!(serde_json::from_value::<Coordinate>(json!([1.0, 2.0, 3.0, 4.0])).is_err());
    }

    #[test]
    fn test_coordinate_serializes_by_arity() {
        assert_eq!(serde_json::to_value(Coordinate::new(1.0, 2.0)).unwrap(), json!([1.0, 2.0]));
        assert_eq!(
            serde_json::to_value(Coordinate::new_3d(1.0, 2.0, 3.0)).unwrap(),
            json!([1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_tree_depths_from_json() {
        let point: CoordinateTree = serde_json::from_value(json!([1, 2])).unwrap();
        assert!(matches!(point, CoordinateTree::Leaf(_)));

        let polygon: CoordinateTree =
            serde_json::from_value(json!([[[0, 0], [1, 0], [1, 1], [0, 0]]])).unwrap();
        assert_eq!(polygon.leaf_count(), 4);

        let empty: CoordinateTree = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty, CoordinateTree::Nested(vec![]));
    }

    #[test]
    fn test_unrecognized_kind_is_kept() {
        let geom: Geometry = serde_json::from_value(json!({
            "type": "CircularString",
            "coordinates": [[0, 0], [1, 1], [2, 0]]
        }))
        .unwrap();
        assert_eq!(geom.kind, GeometryKind::Unrecognized("CircularString".to_string()));
        assert_eq!(geom.kind.coordinate_depth(), None);

        let back = serde_json::to_value(&geom).unwrap();
        assert_eq!(back["type"], "CircularString");
    }

    #[test]
    fn test_feature_passthrough_members() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "id": 7,
            "geometry": {"type": "Point", "coordinates": [1, 2]},
            "properties": {"name": "a", "nested": {"k": [1, 2, 3]}}
        }))
        .unwrap();
        assert_eq!(feature.id, Some(json!(7)));
        assert_eq!(feature.properties["nested"]["k"], json!([1, 2, 3]));

        let null_geometry: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": null
        }))
        .unwrap();
        assert!(null_geometry.geometry.is_none());
    }

    #[test]
    fn test_from_json_reports_feature_index() {
        let collection = FeatureCollection::from_json(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [3, 4]}, "properties": {}}
            ]
        }))
        .unwrap();
        assert_eq!(collection.len(), 2);

        let err = FeatureCollection::from_json(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2, 3, 4]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, "a"]}, "properties": {}}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), "malformed_input");
        assert_eq!(err.feature_index(), Some(1));

        let err = FeatureCollection::from_json(json!("not an object")).unwrap_err();
        assert_eq!(err.kind(), "malformed_input");
        assert_eq!(err.feature_index(), None);
    }

    #[test]
    fn test_same_shape_ignores_values() {
        let a = Geometry::polygon(vec![vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(0.0, 0.0),
        ]]);
        let b = Geometry::polygon(vec![vec![
            Coordinate::new(5.0, 5.0),
            Coordinate::new(6.0, 5.0),
            Coordinate::new(5.0, 5.0),
        ]]);
        let c = Geometry::polygon(vec![vec![Coordinate::new(5.0, 5.0), Coordinate::new(6.0, 5.0)]]);
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn test_collection_vertex_count() {
        let collection = Geometry::collection(vec![
            Geometry::point(Coordinate::new(0.0, 0.0)),
            Geometry::line_string(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]),
        ]);
        assert_eq!(collection.vertex_count(), 3);
    }
}
