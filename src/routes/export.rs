//! Export handlers: CSV download and the in-page long-format rows

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::errors::Result;
use crate::services::export::LongRow;
use crate::services::AppState;

/// Download the study as flattened CSV
pub async fn export_study(
    State(state): State<AppState>,
    Path(study_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let csv = state.export.study_csv(study_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"study_{study_id}_data.csv\""),
            ),
        ],
        csv,
    ))
}

#[derive(Debug, Serialize)]
pub struct LongFormatResponse {
    pub study_id: i32,
    pub rows: Vec<LongRow>,
}

/// The same traversal as the CSV export, returned as structured rows
pub async fn study_long_format(
    State(state): State<AppState>,
    Path(study_id): Path<i32>,
) -> Result<Json<LongFormatResponse>> {
    let rows = state.export.study_long_rows(study_id).await?;
    Ok(Json(LongFormatResponse { study_id, rows }))
}
