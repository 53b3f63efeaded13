//! Projection error types.

use thiserror::Error;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while resolving or applying a projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("Unknown reference system: {0}")]
    UnknownReferenceSystem(String),

    #[error("Coordinate ({x}, {y}) is outside the domain of {projection}")]
    OutOfDomain {
        projection: &'static str,
        x: f64,
        y: f64,
    },

    #[error("{projection} inverse did not converge at ({x}, {y})")]
    DidNotConverge {
        projection: &'static str,
        x: f64,
        y: f64,
    },
}

impl ProjectionError {
    pub fn out_of_domain(projection: &'static str, x: f64, y: f64) -> Self {
        Self::OutOfDomain { projection, x, y }
    }
}

impl From<ProjectionError> for reproject_common::GeometryError {
    fn from(err: ProjectionError) -> Self {
        reproject_common::GeometryError::Projection(err.to_string())
    }
}
