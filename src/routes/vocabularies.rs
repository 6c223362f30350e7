//! Controlled-vocabulary listing consumed by data-entry forms

use axum::Json;
use serde::Serialize;

use crate::vocab::{DOSE_UNIT_CHOICES, OUTCOME_TYPE_CHOICES, ROUTE_CHOICES, SEX_CHOICES};

#[derive(Debug, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VocabulariesResponse {
    pub sex: Vec<Choice>,
    pub dose_unit: Vec<Choice>,
    pub outcome_type: Vec<Choice>,
    pub route_of_exposure: Vec<Choice>,
}

fn choices(table: &'static [(&'static str, &'static str)]) -> Vec<Choice> {
    table
        .iter()
        .map(|(value, label)| Choice { value, label })
        .collect()
}

pub async fn list() -> Json<VocabulariesResponse> {
    Json(VocabulariesResponse {
        sex: choices(SEX_CHOICES),
        dose_unit: choices(DOSE_UNIT_CHOICES),
        outcome_type: choices(OUTCOME_TYPE_CHOICES),
        route_of_exposure: choices(ROUTE_CHOICES),
    })
}
