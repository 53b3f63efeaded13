//! Reference system listing.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReferenceSystemEntry {
    pub code: u32,
    pub id: String,
    pub name: String,
    pub projection: &'static str,
    pub units: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReferenceSystemsResponse {
    pub default_target: String,
    pub reference_systems: Vec<ReferenceSystemEntry>,
}

/// GET /reference-systems - List supported reference systems
pub async fn reference_systems_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ReferenceSystemsResponse> {
    let reference_systems = state
        .engine
        .registry()
        .definitions()
        .map(|def| ReferenceSystemEntry {
            code: def.id.code(),
            id: def.id.to_string(),
            name: def.name.clone(),
            projection: def.projection.name(),
            units: def.units().as_str(),
        })
        .collect();

    Json(ReferenceSystemsResponse {
        default_target: state.default_target.to_string(),
        reference_systems,
    })
}
