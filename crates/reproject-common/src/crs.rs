//! Reference-system identifiers.
//!
//! Every reference system is addressed by its EPSG code. Requests may spell
//! the code as a bare integer or in one of the usual string forms; all of
//! them collapse to a [`ReferenceSystemId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An EPSG-coded reference system identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CrsInput", into = "String")]
pub struct ReferenceSystemId(u32);

impl ReferenceSystemId {
    /// WGS84 geographic, longitude first.
    pub const WGS84: ReferenceSystemId = ReferenceSystemId(4326);

    /// Spherical Web Mercator.
    pub const WEB_MERCATOR: ReferenceSystemId = ReferenceSystemId(3857);

    pub const fn epsg(code: u32) -> Self {
        Self(code)
    }

    /// The numeric EPSG code.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Parse an identifier string.
    ///
    /// Accepts formats like:
    /// - "EPSG:32632", "epsg:32632"
    /// - "32632"
    /// - "urn:ogc:def:crs:EPSG::32632" (an optional version between the colons is ignored)
    /// - "CRS:84", "OGC:CRS84" (WGS84 with longitude first)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let trimmed = s.trim();
        let normalized = trimmed.to_uppercase();

        match normalized.as_str() {
            "CRS:84" | "CRS84" | "OGC:CRS84" | "URN:OGC:DEF:CRS:OGC:1.3:CRS84" => {
                return Ok(Self::WGS84)
            }
            "EPSG:900913" => return Ok(Self::WEB_MERCATOR),
            _ => {}
        }

        let code_part = if let Some(rest) = normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // urn:ogc:def:crs:EPSG:<version>:<code>, version usually empty
            rest.rsplit(':').next().unwrap_or(rest)
        } else if let Some(rest) = normalized.strip_prefix("EPSG:") {
            rest
        } else if normalized.chars().all(|c| c.is_ascii_digit()) && !normalized.is_empty() {
            normalized.as_str()
        } else {
            return Err(CrsParseError::UnsupportedFormat(trimmed.to_string()));
        };

        code_part
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|code| *code > 0)
            .map(Self)
            .ok_or_else(|| CrsParseError::InvalidCode(trimmed.to_string()))
    }
}

impl fmt::Display for ReferenceSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for ReferenceSystemId {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ReferenceSystemId> for String {
    fn from(id: ReferenceSystemId) -> Self {
        id.to_string()
    }
}

impl TryFrom<CrsInput> for ReferenceSystemId {
    type Error = CrsParseError;

    fn try_from(input: CrsInput) -> Result<Self, Self::Error> {
        input.parse()
    }
}

/// A reference-system identifier as it arrives on the wire, before parsing.
///
/// Kept separate from [`ReferenceSystemId`] so that callers can report the
/// exact value the client sent when it does not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrsInput {
    Code(i64),
    Text(String),
}

impl CrsInput {
    pub fn parse(&self) -> Result<ReferenceSystemId, CrsParseError> {
        match self {
            CrsInput::Code(code) => u32::try_from(*code)
                .ok()
                .filter(|c| *c > 0)
                .map(ReferenceSystemId)
                .ok_or_else(|| CrsParseError::InvalidCode(code.to_string())),
            CrsInput::Text(text) => ReferenceSystemId::parse(text),
        }
    }
}

impl fmt::Display for CrsInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsInput::Code(code) => write!(f, "{}", code),
            CrsInput::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<ReferenceSystemId> for CrsInput {
    fn from(id: ReferenceSystemId) -> Self {
        CrsInput::Code(i64::from(id.code()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrsParseError {
    #[error("Invalid EPSG code: {0}")]
    InvalidCode(String),

    #[error("Unsupported CRS format: {0}")]
    UnsupportedFormat(String),
}

impl CrsParseError {
    /// The raw identifier that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            CrsParseError::InvalidCode(raw) | CrsParseError::UnsupportedFormat(raw) => raw,
        }
    }
}
