//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! Every projection works in explicit x-first axis order: longitude before
//! latitude, easting before northing.
//!
//! The [`ReferenceSystemRegistry`] maps EPSG identifiers to projection
//! definitions and resolves a source/target pair into a
//! [`CoordinateTransform`].

pub mod ellipsoid;
pub mod error;
pub mod geographic;
pub mod lambert;
pub mod mercator;
pub mod registry;
pub mod transverse_mercator;

pub use ellipsoid::Ellipsoid;
pub use error::{ProjectionError, ProjectionResult};
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use registry::{
    CoordinateTransform, ProjectionKind, ReferenceSystemDefinition, ReferenceSystemRegistry,
    Units,
};
pub use transverse_mercator::TransverseMercator;
