//! Configuration for the reprojection engine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// What happens to elevation values when a 3D geometry is reprojected.
///
/// Elevation is never itself reprojected; the policy only decides whether
/// the output carries a third component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationPolicy {
    /// Output is 2D.
    #[default]
    Drop,
    /// Every output coordinate of a 3D input gets z = 0.
    Zero,
    /// Original z values are re-attached in order.
    Preserve,
}

impl ElevationPolicy {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Some(Self::Drop),
            "zero" => Some(Self::Zero),
            "preserve" | "keep" => Some(Self::Preserve),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Zero => "zero",
            Self::Preserve => "preserve",
        }
    }
}

impl std::str::FromStr for ElevationPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ConfigError::Invalid(format!("unknown elevation policy: {}", s)))
    }
}

impl std::fmt::Display for ElevationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the reprojection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of features processed per batch.
    pub chunk_size: usize,

    /// Elevation handling for 3D input.
    pub elevation: ElevationPolicy,

    /// Largest allowed gap between the first and last vertex of a ring
    /// that was closed on input, in target units.
    pub closure_tolerance: f64,

    /// Emit a trace event for every transformed vertex.
    pub trace_vertices: bool,

    /// Largest collection accepted by the HTTP service.
    pub max_features: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            elevation: ElevationPolicy::Drop,
            closure_tolerance: 1e-9,
            trace_vertices: false,
            max_features: 100_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REPROJECT_CHUNK_SIZE") {
            match val.parse() {
                Ok(size) => config.chunk_size = size,
                Err(_) => warn!(value = %val, "Ignoring invalid REPROJECT_CHUNK_SIZE"),
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_ELEVATION") {
            match ElevationPolicy::parse(&val) {
                Some(policy) => config.elevation = policy,
                None => warn!(value = %val, "Ignoring invalid REPROJECT_ELEVATION"),
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_CLOSURE_TOLERANCE") {
            match val.parse() {
                Ok(tolerance) => config.closure_tolerance = tolerance,
                Err(_) => warn!(value = %val, "Ignoring invalid REPROJECT_CLOSURE_TOLERANCE"),
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_TRACE_VERTICES") {
            config.trace_vertices = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("REPROJECT_MAX_FEATURES") {
            match val.parse() {
                Ok(max) => config.max_features = max,
                Err(_) => warn!(value = %val, "Ignoring invalid REPROJECT_MAX_FEATURES"),
            }
        }

        config
    }

    /// Load configuration from a YAML file.
    ///
    /// Keys missing from the file keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be > 0".to_string()));
        }

        if !self.closure_tolerance.is_finite() || self.closure_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "closure_tolerance must be a finite, non-negative number".to_string(),
            ));
        }

        if self.max_features == 0 {
            return Err(ConfigError::Invalid("max_features must be > 0".to_string()));
        }

        Ok(())
    }
}
