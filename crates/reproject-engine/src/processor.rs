//! All-or-nothing processing of a feature collection.
//!
//! Features are processed in input order, in batches of the configured
//! chunk size. The first failing feature aborts the whole call; the error
//! names that feature's index. Chunking never changes output order or which
//! failure is reported.

use std::time::Instant;

use projection::{CoordinateTransform, ProjectionError, ReferenceSystemRegistry};
use reproject_common::{
    ConversionError, ConversionResult, Coordinate, Feature, FeatureCollection, Geometry,
    GeometryError, ReferenceSystemId,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::dimension::{self, NormalizedGeometry};
use crate::walker::{self, GeometryWalker, WalkObserver};

/// Converts feature collections between reference systems.
pub struct FeatureCollectionProcessor<'a> {
    registry: &'a ReferenceSystemRegistry,
    config: &'a EngineConfig,
    observer: &'a dyn WalkObserver,
}

impl<'a> FeatureCollectionProcessor<'a> {
    pub fn new(
        registry: &'a ReferenceSystemRegistry,
        config: &'a EngineConfig,
        observer: &'a dyn WalkObserver,
    ) -> Self {
        Self {
            registry,
            config,
            observer,
        }
    }

    /// Reproject every feature of `collection` from `source` to `target`.
    ///
    /// The transform is resolved once, before any feature is touched.
    pub fn process(
        &self,
        collection: FeatureCollection,
        source: ReferenceSystemId,
        target: ReferenceSystemId,
        cancel: &CancellationToken,
    ) -> ConversionResult<FeatureCollection> {
        let start = Instant::now();
        let transform = resolve_transform(self.registry, source, target)?;

        let walker = GeometryWalker::new(self.observer, self.config.closure_tolerance);
        let mut project = |coord: Coordinate| -> Result<Coordinate, GeometryError> {
            let (x, y) = transform.transform(coord.x, coord.y)?;
            Ok(Coordinate::new(x, y))
        };

        let feature_count = collection.len();
        let mut vertices = 0usize;
        let output = self.for_each_feature(collection, cancel, |geometry| {
            vertices += geometry.vertex_count();
            self.convert_geometry(geometry, &walker, &mut project)
        })?;

        info!(
            source = %source,
            target = %target,
            features = feature_count,
            vertices = vertices,
            elevation = %self.config.elevation,
            duration_ms = start.elapsed().as_millis() as u64,
            "Converted feature collection"
        );

        Ok(output)
    }

    /// Reduce every feature of `collection` to 2D without reprojecting.
    pub fn strip_elevation(
        &self,
        collection: FeatureCollection,
        cancel: &CancellationToken,
    ) -> ConversionResult<FeatureCollection> {
        let feature_count = collection.len();
        let output = self.for_each_feature(collection, cancel, |geometry| {
            walker::ensure_supported(&geometry)?;
            dimension::strip_elevation(geometry)
        })?;

        info!(features = feature_count, "Stripped elevation from feature collection");
        Ok(output)
    }

    fn convert_geometry<O, F>(
        &self,
        geometry: Geometry,
        walker: &GeometryWalker<'_, O>,
        project: &mut F,
    ) -> Result<Geometry, GeometryError>
    where
        O: WalkObserver + ?Sized,
        F: FnMut(Coordinate) -> Result<Coordinate, GeometryError>,
    {
        walker::ensure_supported(&geometry)?;
        let NormalizedGeometry {
            geometry,
            elevations,
        } = dimension::normalize(geometry)?;
        let projected = walker.transform(&geometry, project)?;
        dimension::reattach_elevation(projected, elevations.as_deref(), self.config.elevation)
    }

    /// Run `convert` over each feature geometry in chunks, keeping ids and
    /// properties. Stops at the first failure or cancellation.
    fn for_each_feature<F>(
        &self,
        collection: FeatureCollection,
        cancel: &CancellationToken,
        mut convert: F,
    ) -> ConversionResult<FeatureCollection>
    where
        F: FnMut(Geometry) -> Result<Geometry, GeometryError>,
    {
        let chunk_size = self.config.chunk_size.max(1);
        let FeatureCollection { type_, features } = collection;
        let total = features.len();
        let mut output: Vec<Feature> = Vec::with_capacity(total);
        let mut features = features.into_iter().enumerate().peekable();

        let mut chunk_index = 0usize;
        while features.peek().is_some() {
            let chunk_start = output.len();
            for (index, mut feature) in features.by_ref().take(chunk_size) {
                if cancel.is_cancelled() {
                    return Err(ConversionError::Cancelled {
                        feature_index: index,
                    });
                }

                let geometry = feature
                    .geometry
                    .take()
                    .ok_or_else(|| GeometryError::malformed("feature has no geometry"))
                    .and_then(&mut convert)
                    .map_err(|err| ConversionError::at_feature(err, index))?;
                feature.geometry = Some(geometry);
                output.push(feature);
            }

            debug!(
                chunk = chunk_index,
                first_feature = chunk_start,
                features = output.len() - chunk_start,
                total = total,
                "Processed chunk"
            );
            chunk_index += 1;
        }

        Ok(FeatureCollection {
            type_,
            features: output,
        })
    }
}

/// Resolve the transform for a pair of systems, mapping registry errors
/// into conversion errors.
pub fn resolve_transform(
    registry: &ReferenceSystemRegistry,
    source: ReferenceSystemId,
    target: ReferenceSystemId,
) -> ConversionResult<CoordinateTransform> {
    registry.resolve(source, target).map_err(|err| match err {
        ProjectionError::UnknownReferenceSystem(id) => ConversionError::UnknownReferenceSystem { id },
        other => ConversionError::malformed(other.to_string()),
    })
}
