//! Common types shared by the reprojection engine and the services built on it.
//!
//! - [`geometry`]: the in-memory GeoJSON model (coordinates, geometries, features)
//! - [`crs`]: reference-system identifiers and their parsing rules
//! - [`error`]: the conversion error taxonomy

pub mod crs;
pub mod error;
pub mod geometry;

pub use crs::{CrsInput, CrsParseError, ReferenceSystemId};
pub use error::{ConversionError, ConversionResult, GeometryError};
pub use geometry::{
    Coordinate, CoordinateTree, Feature, FeatureCollection, Geometry, GeometryKind,
};
