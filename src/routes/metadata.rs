//! Generic metadata endpoint: the entity-agnostic upsert path

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::services::AppState;
use crate::vocab::EntityKind;

#[derive(Debug, Deserialize)]
pub struct AddMetadataRequest {
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub field_value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddMetadataResponse {
    pub entity_type: EntityKind,
    pub entity_id: i32,
    pub field_name: String,
    pub field_value: Option<String>,
    /// The study owning the entity, for navigating back to its view
    pub study_id: i32,
}

/// Upsert one named value against any of the four entity kinds. A
/// repeated field_name overwrites the stored value instead of
/// duplicating the row.
pub async fn add_metadata(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, i32)>,
    Json(input): Json<AddMetadataRequest>,
) -> Result<Json<AddMetadataResponse>> {
    let kind = EntityKind::parse(&entity_type)?;
    let field_name = input.field_name.unwrap_or_default();

    let (row, study_id) = state
        .metadata
        .upsert(kind, entity_id, &field_name, input.field_value)
        .await?;

    Ok(Json(AddMetadataResponse {
        entity_type: kind,
        entity_id,
        field_name: row.field_name,
        field_value: row.field_value,
        study_id,
    }))
}
