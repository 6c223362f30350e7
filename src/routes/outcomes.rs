//! Outcome handlers: wizard step 4, with three continuation branches

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, Result};
use crate::services::wizard::NewOutcome;
use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct CreateOutcomeResponse {
    pub outcome_id: i32,
    pub dose_group_id: i32,
    /// Keyed by the submission flags: another outcome for this dose
    /// group, back to dose-group selection, or the study detail view
    pub next: String,
}

pub async fn create_outcome(
    State(state): State<AppState>,
    Path(dose_id): Path<i32>,
    Json(input): Json<NewOutcome>,
) -> Result<(StatusCode, Json<CreateOutcomeResponse>)> {
    let add_another = input.add_another;
    let add_another_dose = input.add_another_dose;
    let outcome = state.wizard.create_outcome(dose_id, input).await?;

    let next = if add_another {
        format!("/dose-groups/{dose_id}/outcomes")
    } else {
        // Both remaining branches walk up the tree
        let group = state
            .repo
            .find_dose_group(dose_id)
            .await?
            .ok_or_else(|| AppError::not_found("dose_group", dose_id))?;

        if add_another_dose {
            format!("/animals/{}/dose-groups/select", group.animal_model_id)
        } else {
            let model = state
                .repo
                .find_animal_model(group.animal_model_id)
                .await?
                .ok_or_else(|| AppError::not_found("animal_model", group.animal_model_id))?;
            format!("/studies/{}", model.study_id)
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateOutcomeResponse {
            outcome_id: outcome.id,
            dose_group_id: dose_id,
            next,
        }),
    ))
}
