//! Error types for geometry conversion.
//!
//! Faults found while processing one geometry are raised as
//! [`GeometryError`]. The feature-collection processor tags them with the
//! index of the offending feature, producing a [`ConversionError`].

use thiserror::Error;

/// Result type alias using ConversionError.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// A fault in a single geometry, before it is attributed to a feature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("inconsistent coordinate dimensionality: found {first}D and {second}D coordinates")]
    InconsistentDimensionality { first: usize, second: usize },

    #[error("unsupported geometry kind: {0}")]
    UnsupportedGeometryKind(String),

    #[error("malformed geometry: {0}")]
    MalformedInput(String),

    #[error("ring {ring} is not closed after transform (gap {gap:e})")]
    RingClosure { ring: usize, gap: f64 },

    #[error("projection failed: {0}")]
    Projection(String),
}

impl GeometryError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }
}

/// Primary error type for a conversion request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Unknown reference system: {id}")]
    UnknownReferenceSystem { id: String },

    #[error("Feature {feature_index}: inconsistent coordinate dimensionality (mixed 2D and 3D coordinates)")]
    InconsistentDimensionality { feature_index: usize },

    #[error("Feature {feature_index}: unsupported geometry kind '{kind}'")]
    UnsupportedGeometryKind { kind: String, feature_index: usize },

    #[error("{}", malformed_message(.reason, .feature_index))]
    MalformedInput {
        reason: String,
        feature_index: Option<usize>,
    },

    #[error("Feature {feature_index}: projection failed: {reason}")]
    Projection { reason: String, feature_index: usize },

    #[error("Conversion cancelled before feature {feature_index}")]
    Cancelled { feature_index: usize },
}

fn malformed_message(reason: &str, feature_index: &Option<usize>) -> String {
    match feature_index {
        Some(index) => format!("Feature {}: malformed input: {}", index, reason),
        None => format!("Malformed input: {}", reason),
    }
}

impl ConversionError {
    /// Attribute a geometry fault to the feature at `feature_index`.
    pub fn at_feature(err: GeometryError, feature_index: usize) -> Self {
        match err {
            GeometryError::InconsistentDimensionality { .. } => {
                Self::InconsistentDimensionality { feature_index }
            }
            GeometryError::UnsupportedGeometryKind(kind) => {
                Self::UnsupportedGeometryKind { kind, feature_index }
            }
            GeometryError::MalformedInput(reason) => Self::MalformedInput {
                reason,
                feature_index: Some(feature_index),
            },
            err @ GeometryError::RingClosure { .. } => Self::Projection {
                reason: err.to_string(),
                feature_index,
            },
            GeometryError::Projection(reason) => Self::Projection {
                reason,
                feature_index,
            },
        }
    }

    /// Create a request-level MalformedInput error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
            feature_index: None,
        }
    }

    pub fn unknown_reference_system(id: impl ToString) -> Self {
        Self::UnknownReferenceSystem { id: id.to_string() }
    }

    /// Index of the feature the error occurred at, if it is feature-specific.
    pub fn feature_index(&self) -> Option<usize> {
        match self {
            ConversionError::UnknownReferenceSystem { .. } => None,
            ConversionError::InconsistentDimensionality { feature_index }
            | ConversionError::UnsupportedGeometryKind { feature_index, .. }
            | ConversionError::Projection { feature_index, .. }
            | ConversionError::Cancelled { feature_index } => Some(*feature_index),
            ConversionError::MalformedInput { feature_index, .. } => *feature_index,
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::UnknownReferenceSystem { .. } => "unknown_reference_system",
            ConversionError::InconsistentDimensionality { .. } => "inconsistent_dimensionality",
            ConversionError::UnsupportedGeometryKind { .. } => "unsupported_geometry_kind",
            ConversionError::MalformedInput { .. } => "malformed_input",
            ConversionError::Projection { .. } => "projection_failed",
            ConversionError::Cancelled { .. } => "cancelled",
        }
    }
}

impl From<crate::crs::CrsParseError> for ConversionError {
    fn from(err: crate::crs::CrsParseError) -> Self {
        ConversionError::UnknownReferenceSystem {
            id: err.raw().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_feature_tags_index() {
        let err = ConversionError::at_feature(
            GeometryError::UnsupportedGeometryKind("Curve".to_string()),
            1,
        );
        assert_eq!(
            err,
            ConversionError::UnsupportedGeometryKind {
                kind: "Curve".to_string(),
                feature_index: 1
            }
        );
        assert_eq!(err.feature_index(), Some(1));
        assert_eq!(err.kind(), "unsupported_geometry_kind");
    }

    #[test]
    fn test_ring_closure_maps_to_projection() {
        let err = ConversionError::at_feature(GeometryError::RingClosure { ring: 0, gap: 1.0 }, 3);
        assert_eq!(err.kind(), "projection_failed");
        assert!(err.to_string().contains("ring 0"));
    }

    #[test]
    fn test_malformed_display() {
        let request_level = ConversionError::malformed("missing geojson");
        assert_eq!(request_level.to_string(), "Malformed input: missing geojson");
        assert_eq!(request_level.feature_index(), None);

        let feature_level = ConversionError::at_feature(GeometryError::malformed("missing geometry"), 2);
        assert_eq!(
            feature_level.to_string(),
            "Feature 2: malformed input: missing geometry"
        );
    }

    #[test]
    fn test_crs_parse_error_conversion() {
        let err: ConversionError = crate::crs::ReferenceSystemId::parse("FOO:1").unwrap_err().into();
        assert_eq!(
            err,
            ConversionError::UnknownReferenceSystem {
                id: "FOO:1".to_string()
            }
        );
    }
}
