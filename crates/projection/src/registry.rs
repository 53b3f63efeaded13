//! EPSG reference-system registry and coordinate transforms.
//!
//! The registry is populated once with every supported definition and is
//! read-only afterwards, so a single instance can be shared behind an `Arc`
//! by any number of concurrent conversions.

use std::collections::BTreeMap;

use reproject_common::ReferenceSystemId;
use tracing::debug;

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, ProjectionResult};
use crate::geographic::check_geographic;
use crate::lambert::LambertConformal;
use crate::mercator::WebMercator;
use crate::transverse_mercator::TransverseMercator;

/// Native units of a reference system's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Degrees,
    Meters,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Degrees => "degrees",
            Units::Meters => "meters",
        }
    }
}

/// How a reference system maps to and from geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    /// Longitude/latitude in degrees, longitude first.
    Geographic,
    WebMercator(WebMercator),
    TransverseMercator(TransverseMercator),
    LambertConformal(LambertConformal),
}

impl ProjectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionKind::Geographic => "Geographic",
            ProjectionKind::WebMercator(_) => "Web Mercator",
            ProjectionKind::TransverseMercator(_) => "Transverse Mercator",
            ProjectionKind::LambertConformal(_) => "Lambert Conformal Conic",
        }
    }

    pub fn units(&self) -> Units {
        match self {
            ProjectionKind::Geographic => Units::Degrees,
            _ => Units::Meters,
        }
    }

    /// Native (x, y) to longitude/latitude in degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        match self {
            ProjectionKind::Geographic => {
                check_geographic("Geographic", x, y)?;
                Ok((x, y))
            }
            ProjectionKind::WebMercator(p) => p.inverse(x, y),
            ProjectionKind::TransverseMercator(p) => p.inverse(x, y),
            ProjectionKind::LambertConformal(p) => p.inverse(x, y),
        }
    }

    /// Longitude/latitude in degrees to native (x, y).
    pub fn from_geographic(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        match self {
            ProjectionKind::Geographic => {
                check_geographic("Geographic", lon, lat)?;
                Ok((lon, lat))
            }
            ProjectionKind::WebMercator(p) => p.forward(lon, lat),
            ProjectionKind::TransverseMercator(p) => p.forward(lon, lat),
            ProjectionKind::LambertConformal(p) => p.forward(lon, lat),
        }
    }
}

/// A registered reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSystemDefinition {
    pub id: ReferenceSystemId,
    /// Human-readable name, e.g. "WGS 84 / UTM zone 32N"
    pub name: String,
    pub projection: ProjectionKind,
}

impl ReferenceSystemDefinition {
    pub fn new(id: ReferenceSystemId, name: impl Into<String>, projection: ProjectionKind) -> Self {
        Self {
            id,
            name: name.into(),
            projection,
        }
    }

    pub fn units(&self) -> Units {
        self.projection.units()
    }
}

/// Lookup table from EPSG code to definition.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSystemRegistry {
    definitions: BTreeMap<ReferenceSystemId, ReferenceSystemDefinition>,
}

impl ReferenceSystemRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in definition.
    ///
    /// - Geographic: EPSG:4326 (WGS 84), 4258 (ETRS89), 4269 (NAD83)
    /// - EPSG:3857 Web Mercator
    /// - WGS 84 UTM zones 1-60 north (326xx) and south (327xx)
    /// - ETRS89 UTM zones 28N-38N (258xx)
    /// - NAD83 UTM zones 1N-23N (269xx)
    /// - EPSG:2154 RGF93 / Lambert-93
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for (code, name) in [(4326, "WGS 84"), (4258, "ETRS89"), (4269, "NAD83")] {
            registry.register(ReferenceSystemDefinition::new(
                ReferenceSystemId::epsg(code),
                name,
                ProjectionKind::Geographic,
            ));
        }

        registry.register(ReferenceSystemDefinition::new(
            ReferenceSystemId::WEB_MERCATOR,
            "WGS 84 / Pseudo-Mercator",
            ProjectionKind::WebMercator(WebMercator::default()),
        ));

        for zone in 1..=60u8 {
            registry.register_utm(32600, "WGS 84", Ellipsoid::WGS84, zone, false);
            registry.register_utm(32700, "WGS 84", Ellipsoid::WGS84, zone, true);
        }
        for zone in 28..=38u8 {
            registry.register_utm(25800, "ETRS89", Ellipsoid::GRS80, zone, false);
        }
        for zone in 1..=23u8 {
            registry.register_utm(26900, "NAD83", Ellipsoid::GRS80, zone, false);
        }

        registry.register(ReferenceSystemDefinition::new(
            ReferenceSystemId::epsg(2154),
            "RGF93 v1 / Lambert-93",
            ProjectionKind::LambertConformal(LambertConformal::lambert93()),
        ));

        debug!(count = registry.len(), "Reference system registry initialized");
        registry
    }

    fn register_utm(&mut self, base: u32, datum: &str, ellipsoid: Ellipsoid, zone: u8, south: bool) {
        let hemisphere = if south { 'S' } else { 'N' };
        self.register(ReferenceSystemDefinition::new(
            ReferenceSystemId::epsg(base + u32::from(zone)),
            format!("{} / UTM zone {}{}", datum, zone, hemisphere),
            ProjectionKind::TransverseMercator(TransverseMercator::utm(ellipsoid, zone, south)),
        ));
    }

    /// Add or replace a definition.
    pub fn register(&mut self, definition: ReferenceSystemDefinition) {
        self.definitions.insert(definition.id, definition);
    }

    pub fn get(&self, id: ReferenceSystemId) -> Option<&ReferenceSystemDefinition> {
        self.definitions.get(&id)
    }

    pub fn contains(&self, id: ReferenceSystemId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// All definitions, ordered by EPSG code.
    pub fn definitions(&self) -> impl Iterator<Item = &ReferenceSystemDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve a transform from `source` to `target`.
    ///
    /// Fails with [`ProjectionError::UnknownReferenceSystem`] naming the
    /// first identifier that has no definition.
    pub fn resolve(
        &self,
        source: ReferenceSystemId,
        target: ReferenceSystemId,
    ) -> ProjectionResult<CoordinateTransform> {
        let lookup = |id: ReferenceSystemId| {
            self.get(id)
                .ok_or_else(|| ProjectionError::UnknownReferenceSystem(id.to_string()))
        };
        let from = lookup(source)?;
        let to = lookup(target)?;

        debug!(
            source = %source,
            target = %target,
            from = from.projection.name(),
            to = to.projection.name(),
            "Resolved coordinate transform"
        );

        Ok(CoordinateTransform {
            source,
            target,
            from: from.projection,
            to: to.projection,
        })
    }
}

/// A resolved source-to-target coordinate mapping.
///
/// Holds only projection constants, so it is cheap to copy and safe to
/// share across threads. Coordinates pass through geographic WGS 84-
/// equivalent longitude/latitude; no datum shift is applied between the
/// supported datums.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    source: ReferenceSystemId,
    target: ReferenceSystemId,
    from: ProjectionKind,
    to: ProjectionKind,
}

impl CoordinateTransform {
    pub fn source(&self) -> ReferenceSystemId {
        self.source
    }

    pub fn target(&self) -> ReferenceSystemId {
        self.target
    }

    /// True when source and target are the same system.
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// The transform in the opposite direction.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            from: self.to,
            to: self.from,
        }
    }

    /// Transform a planar (x, y) pair.
    pub fn transform(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        if self.is_identity() {
            return Ok((x, y));
        }
        let (lon, lat) = self.from.to_geographic(x, y)?;
        self.to.from_geographic(lon, lat)
    }
}
