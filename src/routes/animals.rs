//! Animal model handlers: wizard step 2

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::Result;
use crate::services::wizard::NewAnimalModel;
use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct CreateAnimalModelResponse {
    pub animal_model_id: i32,
    pub study_id: i32,
    /// The next wizard step: dose group creation
    pub next: String,
}

pub async fn create_animal_model(
    State(state): State<AppState>,
    Path(study_id): Path<i32>,
    Json(input): Json<NewAnimalModel>,
) -> Result<(StatusCode, Json<CreateAnimalModelResponse>)> {
    let model = state.wizard.create_animal_model(study_id, input).await?;
    let next = format!("/animals/{}/dose-groups", model.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateAnimalModelResponse {
            animal_model_id: model.id,
            study_id,
            next,
        }),
    ))
}
