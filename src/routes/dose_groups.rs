//! Dose group handlers: wizard step 3 and the outcome selection step

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::db::models::DoseGroup;
use crate::errors::Result;
use crate::services::wizard::NewDoseGroup;
use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct CreateDoseGroupResponse {
    pub dose_group_id: i32,
    pub animal_model_id: i32,
    /// Another dose-group form when `add_another` was set, otherwise the
    /// dose-group selection step
    pub next: String,
}

pub async fn create_dose_group(
    State(state): State<AppState>,
    Path(animal_id): Path<i32>,
    Json(input): Json<NewDoseGroup>,
) -> Result<(StatusCode, Json<CreateDoseGroupResponse>)> {
    let add_another = input.add_another;
    let group = state.wizard.create_dose_group(animal_id, input).await?;

    let next = if add_another {
        format!("/animals/{animal_id}/dose-groups")
    } else {
        format!("/animals/{animal_id}/dose-groups/select")
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateDoseGroupResponse {
            dose_group_id: group.id,
            animal_model_id: animal_id,
            next,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct SelectDoseResponse {
    pub animal_model_id: i32,
    pub dose_groups: Vec<DoseGroup>,
    /// Set when the animal model has no dose groups yet: the client is
    /// sent back to dose-group creation instead of an empty selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Outcomes are never created without first picking a dose group here.
pub async fn select_dose_for_outcome(
    State(state): State<AppState>,
    Path(animal_id): Path<i32>,
) -> Result<Json<SelectDoseResponse>> {
    let (model, dose_groups) = state.wizard.dose_groups_for_selection(animal_id).await?;

    if dose_groups.is_empty() {
        return Ok(Json(SelectDoseResponse {
            animal_model_id: model.id,
            dose_groups,
            warning: Some(
                "No dose groups exist for this animal model. Please add a dose group first."
                    .to_string(),
            ),
            next: Some(format!("/animals/{animal_id}/dose-groups")),
        }));
    }

    Ok(Json(SelectDoseResponse {
        animal_model_id: model.id,
        dose_groups,
        warning: None,
        next: None,
    }))
}
