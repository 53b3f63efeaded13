//! Common test fixtures for reprojection tests.
//!
//! This module provides pre-defined GeoJSON inputs that represent common
//! scenarios: survey data in UTM, parcels with holes, 3D scans, and the
//! malformed inputs clients actually send.

use reproject_common::{Coordinate, Feature, FeatureCollection, Geometry};
use serde_json::{json, Value};

/// Common EPSG codes for testing.
pub mod crs {
    /// WGS84 geographic (longitude first)
    pub const WGS84: u32 = 4326;

    /// Web Mercator
    pub const WEB_MERCATOR: u32 = 3857;

    /// WGS84 / UTM zone 31N (Paris)
    pub const UTM_31N: u32 = 32631;

    /// WGS84 / UTM zone 32N (central Europe, Tunisia)
    pub const UTM_32N: u32 = 32632;

    /// WGS84 / UTM zone 23S (Rio de Janeiro)
    pub const UTM_23S: u32 = 32723;

    /// ETRS89 / UTM zone 32N
    pub const ETRS89_UTM_32N: u32 = 25832;

    /// RGF93 / Lambert-93
    pub const LAMBERT_93: u32 = 2154;

    /// A well-formed code with no registered definition
    pub const UNKNOWN: u32 = 999_999;
}

/// Reference positions with independently known projected values.
pub mod points {
    /// Zone 32N central meridian at 45°N: (lon, lat) and (easting, northing)
    pub const UTM_32N_CENTRAL: ((f64, f64), (f64, f64)) = ((9.0, 45.0), (500_000.0, 4_982_950.400));

    /// Eiffel Tower in zone 31N
    pub const EIFFEL_TOWER_31N: ((f64, f64), (f64, f64)) =
        ((2.2945, 48.8583), (448_251.9, 5_411_943.8));

    /// Lambert-93 false origin
    pub const LAMBERT_93_ORIGIN: ((f64, f64), (f64, f64)) =
        ((3.0, 46.5), (700_000.0, 6_600_000.0));

    /// Paris in Lambert-93
    pub const PARIS_LAMBERT_93: ((f64, f64), (f64, f64)) =
        ((2.3522, 48.8566), (652_469.02, 6_862_035.26));
}

/// Two-vertex LineString in EPSG:32632, about 130 km east of the central meridian.
pub fn utm_line() -> Geometry {
    Geometry::line_string(vec![
        Coordinate::new(630349.20, 3576258.53),
        Coordinate::new(630348.83, 3576258.13),
    ])
}

/// Polygon in EPSG:32632 with one hole; both rings closed.
pub fn utm_polygon_with_hole() -> Geometry {
    Geometry::polygon(vec![
        vec![
            Coordinate::new(500000.0, 5000000.0),
            Coordinate::new(501000.0, 5000000.0),
            Coordinate::new(501000.0, 5001000.0),
            Coordinate::new(500000.0, 5001000.0),
            Coordinate::new(500000.0, 5000000.0),
        ],
        vec![
            Coordinate::new(500250.0, 5000250.0),
            Coordinate::new(500250.0, 5000750.0),
            Coordinate::new(500750.0, 5000750.0),
            Coordinate::new(500250.0, 5000250.0),
        ],
    ])
}

/// Uniformly 3D LineString in EPSG:32632.
pub fn utm_line_3d() -> Geometry {
    Geometry::line_string(vec![
        Coordinate::new_3d(630349.20, 3576258.53, 112.5),
        Coordinate::new_3d(630348.83, 3576258.13, 113.0),
        Coordinate::new_3d(630340.00, 3576250.00, 114.25),
    ])
}

/// LineString mixing 2D and 3D positions.
pub fn mixed_arity_line() -> Geometry {
    Geometry::line_string(vec![
        Coordinate::new(630349.20, 3576258.53),
        Coordinate::new_3d(630348.83, 3576258.13, 10.0),
    ])
}

/// A geometry whose kind is not one of the seven GeoJSON geometry types.
pub fn unsupported_geometry() -> Geometry {
    serde_json::from_value(json!({
        "type": "CircularString",
        "coordinates": [[630000.0, 3576000.0], [630100.0, 3576100.0], [630200.0, 3576000.0]]
    }))
    .expect("fixture geometry is valid JSON")
}

/// One geometry of every supported kind, all in EPSG:32632.
pub fn utm_geometries_of_every_kind() -> Vec<Geometry> {
    let point = Geometry::point(Coordinate::new(630349.20, 3576258.53));
    let multi_point = serde_json::from_value(json!({
        "type": "MultiPoint",
        "coordinates": [[630349.20, 3576258.53], [631000.0, 3577000.0]]
    }))
    .expect("fixture geometry is valid JSON");
    let multi_line = serde_json::from_value(json!({
        "type": "MultiLineString",
        "coordinates": [
            [[600000.0, 3500000.0], [600500.0, 3500500.0]],
            [[610000.0, 3510000.0], [610500.0, 3510500.0], [611000.0, 3510000.0]]
        ]
    }))
    .expect("fixture geometry is valid JSON");
    let multi_polygon = Geometry::multi_polygon(vec![
        vec![vec![
            Coordinate::new(400000.0, 4000000.0),
            Coordinate::new(401000.0, 4000000.0),
            Coordinate::new(401000.0, 4001000.0),
            Coordinate::new(400000.0, 4000000.0),
        ]],
        vec![vec![
            Coordinate::new(420000.0, 4020000.0),
            Coordinate::new(421000.0, 4020000.0),
            Coordinate::new(421000.0, 4021000.0),
            Coordinate::new(420000.0, 4020000.0),
        ]],
    ]);
    let collection = Geometry::collection(vec![point.clone(), utm_line()]);

    vec![
        point,
        multi_point,
        utm_line(),
        multi_line,
        utm_polygon_with_hole(),
        multi_polygon,
        collection,
    ]
}

/// Wrap geometries as features with an index property.
pub fn collection_of(geometries: Vec<Geometry>) -> FeatureCollection {
    let features = geometries
        .into_iter()
        .enumerate()
        .map(|(i, geometry)| {
            Feature::new(geometry)
                .with_id(i as u64)
                .with_properties(json!({"index": i, "name": format!("feature-{}", i)}))
        })
        .collect();
    FeatureCollection::new().with_features(features)
}

/// Three features, the second of an unsupported kind.
pub fn collection_with_unsupported_second() -> FeatureCollection {
    collection_of(vec![utm_line(), unsupported_geometry(), utm_polygon_with_hole()])
}

/// Raw JSON body for a `/convert` request.
pub fn convert_request(source: Value, geojson: Value) -> Value {
    json!({
        "source_crs": source,
        "geojson": geojson,
    })
}

/// The UTM line as a raw FeatureCollection document.
pub fn utm_line_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": [[630349.20, 3576258.53], [630348.83, 3576258.13]]
            },
            "properties": {"name": "survey line", "tags": ["a", "b"]}
        }]
    })
}
