//! Study handlers: wizard step 1 plus listing, detail and deletion

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::services::wizard::{NewStudy, StudyDetail, StudySummary};
use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct CreateStudyResponse {
    pub study_id: i32,
    pub name: String,
    /// The next wizard step: animal model creation
    pub next: String,
}

/// Step-1 handler. Validation failures re-surface as 400s with nothing
/// persisted; success chains to the animal-model step.
pub async fn create_study(
    State(state): State<AppState>,
    Json(input): Json<NewStudy>,
) -> Result<(StatusCode, Json<CreateStudyResponse>)> {
    let study = state.wizard.create_study(input).await?;
    let next = format!("/studies/{}/animals", study.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateStudyResponse {
            study_id: study.id,
            name: study.name,
            next,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Cap on the number of studies returned, newest first
    pub limit: Option<u64>,
}

pub async fn list_studies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StudySummary>>> {
    let studies = state.wizard.list_studies(params.limit).await?;
    Ok(Json(studies))
}

pub async fn get_study(
    State(state): State<AppState>,
    Path(study_id): Path<i32>,
) -> Result<Json<StudyDetail>> {
    let detail = state.wizard.study_detail(study_id).await?;
    Ok(Json(detail))
}

/// The only deletion path: removes the study and its whole owned subtree,
/// including metadata rows referencing the deleted entities.
pub async fn delete_study(
    State(state): State<AppState>,
    Path(study_id): Path<i32>,
) -> Result<StatusCode> {
    state.wizard.delete_study(study_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
