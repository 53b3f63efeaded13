//! GeoJSON feature-collection reprojection.
//!
//! The engine takes a FeatureCollection in one EPSG reference system and
//! returns the same collection, feature for feature and vertex for vertex,
//! in another. Processing is all-or-nothing: the first failing feature
//! aborts the call with an error naming that feature's index.
//!
//! ```ignore
//! let engine = Engine::with_defaults();
//! let output = engine.convert(collection, ReferenceSystemId::epsg(32632), ReferenceSystemId::WGS84)?;
//! ```

pub mod config;
pub mod dimension;
pub mod processor;
pub mod walker;

use std::sync::Arc;

use projection::ReferenceSystemRegistry;
use reproject_common::{ConversionResult, FeatureCollection, ReferenceSystemId};

pub use tokio_util::sync::{CancellationToken, DropGuard};
pub use config::{ConfigError, ElevationPolicy, EngineConfig};
pub use dimension::{normalize, reattach_elevation, NormalizedGeometry};
pub use processor::FeatureCollectionProcessor;
pub use walker::{GeometryWalker, NoopObserver, TracingObserver, WalkObserver};

/// Engine configuration bundled with the shared reference-system registry.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<ReferenceSystemRegistry>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(registry: Arc<ReferenceSystemRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Engine with the built-in registry and default configuration.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(ReferenceSystemRegistry::with_defaults()),
            EngineConfig::default(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ReferenceSystemRegistry> {
        &self.registry
    }

    /// Reproject `collection` from `source` to `target`.
    pub fn convert(
        &self,
        collection: FeatureCollection,
        source: ReferenceSystemId,
        target: ReferenceSystemId,
    ) -> ConversionResult<FeatureCollection> {
        self.convert_with_cancel(collection, source, target, &CancellationToken::new())
    }

    /// Reproject `collection`, checking `cancel` between features.
    pub fn convert_with_cancel(
        &self,
        collection: FeatureCollection,
        source: ReferenceSystemId,
        target: ReferenceSystemId,
        cancel: &CancellationToken,
    ) -> ConversionResult<FeatureCollection> {
        self.with_processor(|processor| processor.process(collection, source, target, cancel))
    }

    /// Reduce every feature of `collection` to 2D.
    pub fn strip_elevation(
        &self,
        collection: FeatureCollection,
        cancel: &CancellationToken,
    ) -> ConversionResult<FeatureCollection> {
        self.with_processor(|processor| processor.strip_elevation(collection, cancel))
    }

    fn with_processor<T>(&self, f: impl FnOnce(&FeatureCollectionProcessor<'_>) -> T) -> T {
        if self.config.trace_vertices {
            f(&FeatureCollectionProcessor::new(&self.registry, &self.config, &TracingObserver))
        } else {
            f(&FeatureCollectionProcessor::new(&self.registry, &self.config, &NoopObserver))
        }
    }
}

/// Reproject `collection` from `source` to `target`.
pub fn convert(
    collection: FeatureCollection,
    source: ReferenceSystemId,
    target: ReferenceSystemId,
    config: &EngineConfig,
    registry: &ReferenceSystemRegistry,
) -> ConversionResult<FeatureCollection> {
    let observer: &dyn WalkObserver = if config.trace_vertices {
        &TracingObserver
    } else {
        &NoopObserver
    };
    FeatureCollectionProcessor::new(registry, config, observer).process(
        collection,
        source,
        target,
        &CancellationToken::new(),
    )
}

/// Reduce every feature of `collection` to 2D, failing on mixed arity.
pub fn strip_elevation(collection: FeatureCollection) -> ConversionResult<FeatureCollection> {
    let registry = ReferenceSystemRegistry::new();
    let config = EngineConfig::default();
    FeatureCollectionProcessor::new(&registry, &config, &NoopObserver)
        .strip_elevation(collection, &CancellationToken::new())
}
