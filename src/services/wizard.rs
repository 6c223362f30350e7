//! Entity creation workflow
//!
//! The linear wizard: Study, then AnimalModel, then DoseGroup, then
//! Outcome, each step validating its own input, persisting one row and
//! optionally a batch of metadata pairs. Continuation between steps is
//! decided at the route layer from the submission flags; this service
//! owns validation and persistence only.
//!
//! The primary insert and its metadata inserts are separate commits, so a
//! crash between them can leave an entity without its metadata. Accepted
//! for this workflow's risk profile.

use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::db::models::{AnimalModel, DoseGroup, Metadata, Outcome, Study};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics::METRICS_PREFIX;
use crate::validation;
use crate::vocab::{DoseUnit, EntityKind, OutcomeType, RouteOfExposure, Sex};

/// Step-1 submission: the study itself
#[derive(Debug, Deserialize, Validate)]
pub struct NewStudy {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub toxin_name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Optional, strict YYYY-MM-DD when non-empty
    #[serde(default)]
    pub date_conducted: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub contributor_name: Option<String>,

    pub contributor_email: String,

    #[serde(default)]
    pub publication_reference: Option<String>,

    #[serde(default)]
    pub additional_field_names: Vec<String>,

    #[serde(default)]
    pub additional_field_values: Vec<String>,
}

/// Step-2 submission: one animal cohort
#[derive(Debug, Deserialize, Validate)]
pub struct NewAnimalModel {
    #[validate(length(min = 1, max = 255))]
    pub species: String,

    #[serde(default)]
    pub strain: Option<String>,

    pub sex: String,

    #[serde(default)]
    pub age: Option<String>,

    #[serde(default)]
    pub weight: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub additional_field_names: Vec<String>,

    #[serde(default)]
    pub additional_field_values: Vec<String>,
}

/// Step-3 submission: one exposure-level cohort. Numeric fields arrive as
/// text and are parsed server-side.
#[derive(Debug, Deserialize)]
pub struct NewDoseGroup {
    pub dose_value: String,

    pub dose_unit: String,

    #[serde(default)]
    pub custom_dose_unit: Option<String>,

    pub group_size: String,

    #[serde(default)]
    pub exposure_duration: Option<String>,

    pub route_of_exposure: String,

    #[serde(default)]
    pub custom_route: Option<String>,

    /// Continuation flag: loop back to a fresh dose-group form
    #[serde(default)]
    pub add_another: bool,

    #[serde(default)]
    pub additional_field_names: Vec<String>,

    #[serde(default)]
    pub additional_field_values: Vec<String>,
}

/// Step-4 submission: one measured result
#[derive(Debug, Deserialize)]
pub struct NewOutcome {
    pub outcome_type: String,

    #[serde(default)]
    pub custom_outcome_type: Option<String>,

    /// Generic value field, used for every non-cancer outcome
    #[serde(default)]
    pub value: Option<String>,

    /// Cancer-specific tumor count, validated as a non-negative integer
    #[serde(default)]
    pub cancer_value: Option<String>,

    #[serde(default)]
    pub observation_time: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Continuation flag: another outcome for the same dose group
    #[serde(default)]
    pub add_another: bool,

    /// Continuation flag: back to dose-group selection
    #[serde(default)]
    pub add_another_dose: bool,

    #[serde(default)]
    pub additional_field_names: Vec<String>,

    #[serde(default)]
    pub additional_field_values: Vec<String>,
}

/// Pair up the parallel metadata arrays from a submission. Pairs with a
/// blank or missing name are silently skipped; values are index-matched
/// and trimmed.
pub fn metadata_pairs(names: &[String], values: &[String]) -> Vec<(String, String)> {
    names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            values
                .get(i)
                .map(|value| (name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Detail view of a study: the full owned tree with attached metadata
#[derive(Debug, Serialize)]
pub struct StudyDetail {
    pub study: StudySummary,
    pub metadata: Vec<MetadataItem>,
    pub animal_models: Vec<AnimalModelDetail>,
}

/// Study fields safe for rendering; the contributor e-mail stays private.
#[derive(Debug, Serialize)]
pub struct StudySummary {
    pub id: i32,
    pub name: String,
    pub toxin: String,
    pub description: Option<String>,
    pub date_conducted: Option<chrono::NaiveDate>,
    pub author: Option<String>,
    pub contributor_name: Option<String>,
    pub publication_reference: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl StudySummary {
    pub fn from_parts(study: &Study, toxin_name: &str) -> Self {
        Self {
            id: study.id,
            name: study.name.clone(),
            toxin: toxin_name.to_owned(),
            description: study.description.clone(),
            date_conducted: study.date_conducted,
            author: study.author.clone(),
            contributor_name: study.contributor_name.clone(),
            publication_reference: study.publication_reference.clone(),
            created_at: study.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnimalModelDetail {
    #[serde(flatten)]
    pub model: AnimalModel,
    pub metadata: Vec<MetadataItem>,
    pub dose_groups: Vec<DoseGroupDetail>,
}

#[derive(Debug, Serialize)]
pub struct DoseGroupDetail {
    #[serde(flatten)]
    pub group: DoseGroup,
    pub metadata: Vec<MetadataItem>,
    pub outcomes: Vec<OutcomeDetail>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeDetail {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub metadata: Vec<MetadataItem>,
}

#[derive(Debug, Serialize)]
pub struct MetadataItem {
    pub field_name: String,
    pub field_value: Option<String>,
}

impl From<Metadata> for MetadataItem {
    fn from(row: Metadata) -> Self {
        Self {
            field_name: row.field_name,
            field_value: row.field_value,
        }
    }
}

/// The wizard's validation and persistence
pub struct WizardService {
    repo: Repository,
}

impl WizardService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Step 1: validate and create the study, looking up or creating its
    /// toxin by exact name. Nothing is persisted on validation failure.
    pub async fn create_study(&self, input: NewStudy) -> Result<Study> {
        input.validate().map_err(validator_error)?;
        validation::validate_contributor_email(&input.contributor_email)?;
        let date_conducted = validation::parse_date_conducted(input.date_conducted.as_deref())?;

        let toxin = self.repo.find_or_create_toxin(input.toxin_name.trim()).await?;

        let study = self
            .repo
            .create_study(
                input.name,
                toxin.id,
                input.description,
                date_conducted,
                input.author,
                input.contributor_name,
                input.contributor_email,
                input.publication_reference,
            )
            .await?;

        self.ingest_metadata(
            EntityKind::Study,
            study.id,
            &input.additional_field_names,
            &input.additional_field_values,
        )
        .await?;

        metrics::counter!(format!("{METRICS_PREFIX}_studies_created_total")).increment(1);
        tracing::info!(study_id = study.id, toxin_id = toxin.id, "Study created");
        Ok(study)
    }

    /// Step 2: create an animal model under an existing study
    pub async fn create_animal_model(
        &self,
        study_id: i32,
        input: NewAnimalModel,
    ) -> Result<AnimalModel> {
        self.repo
            .find_study(study_id)
            .await?
            .ok_or_else(|| AppError::not_found("study", study_id))?;

        input.validate().map_err(validator_error)?;
        let sex = Sex::parse(&input.sex)?;

        let model = self
            .repo
            .create_animal_model(
                study_id,
                input.species,
                input.strain,
                sex.as_str().to_owned(),
                input.age,
                input.weight,
                input.description,
            )
            .await?;

        self.ingest_metadata(
            EntityKind::AnimalModel,
            model.id,
            &input.additional_field_names,
            &input.additional_field_values,
        )
        .await?;

        metrics::counter!(format!("{METRICS_PREFIX}_animal_models_created_total")).increment(1);
        tracing::info!(study_id, animal_model_id = model.id, "Animal model created");
        Ok(model)
    }

    /// Step 3: create a dose group under an existing animal model. On a
    /// numeric validation failure the error carries the animal's existing
    /// dose groups so the client can re-show the step with context.
    pub async fn create_dose_group(
        &self,
        animal_model_id: i32,
        input: NewDoseGroup,
    ) -> Result<DoseGroup> {
        self.repo
            .find_animal_model(animal_model_id)
            .await?
            .ok_or_else(|| AppError::not_found("animal_model", animal_model_id))?;

        let parsed = validation::parse_dose_value(&input.dose_value)
            .and_then(|dose_value| {
                Ok((dose_value, validation::parse_group_size(&input.group_size)?))
            });
        let (dose_value, group_size) = match parsed {
            Ok(values) => values,
            Err(AppError::Validation { message, field, .. }) => {
                let existing = self.repo.list_dose_groups(animal_model_id).await?;
                return Err(AppError::validation_with_details(
                    message,
                    field,
                    json!({ "existing_dose_groups": existing }),
                ));
            }
            Err(other) => return Err(other),
        };

        let unit = DoseUnit::from_submission(&input.dose_unit, input.custom_dose_unit.as_deref())?;
        let route = RouteOfExposure::from_submission(
            &input.route_of_exposure,
            input.custom_route.as_deref(),
        )?;

        let (stored_unit, custom_unit) = unit.stored();
        let group = self
            .repo
            .create_dose_group(
                animal_model_id,
                dose_value,
                stored_unit.to_owned(),
                custom_unit.map(str::to_owned),
                group_size,
                input.exposure_duration,
                route.resolved().to_owned(),
            )
            .await?;

        self.ingest_metadata(
            EntityKind::DoseGroup,
            group.id,
            &input.additional_field_names,
            &input.additional_field_values,
        )
        .await?;

        metrics::counter!(format!("{METRICS_PREFIX}_dose_groups_created_total")).increment(1);
        tracing::info!(animal_model_id, dose_group_id = group.id, "Dose group created");
        Ok(group)
    }

    /// Step 4: record an outcome against an existing dose group
    pub async fn create_outcome(&self, dose_group_id: i32, input: NewOutcome) -> Result<Outcome> {
        self.repo
            .find_dose_group(dose_group_id)
            .await?
            .ok_or_else(|| AppError::not_found("dose_group", dose_group_id))?;

        let outcome_type =
            OutcomeType::from_submission(&input.outcome_type, input.custom_outcome_type.as_deref())?;

        // Cancer outcomes record a tumor count through a dedicated field;
        // everything else stores the generic value unvalidated.
        let value = match input.cancer_value.as_deref() {
            Some(count) if outcome_type.is_cancer() && !count.trim().is_empty() => {
                validation::parse_tumor_count(count)?;
                count.trim().to_owned()
            }
            _ => input
                .value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::MissingField {
                    field: "value".to_owned(),
                })?,
        };

        let (stored_type, custom_type) = outcome_type.stored();
        let outcome = self
            .repo
            .create_outcome(
                dose_group_id,
                stored_type.to_owned(),
                custom_type.map(str::to_owned),
                value,
                input.observation_time,
                input.notes,
            )
            .await?;

        self.ingest_metadata(
            EntityKind::Outcome,
            outcome.id,
            &input.additional_field_names,
            &input.additional_field_values,
        )
        .await?;

        metrics::counter!(format!("{METRICS_PREFIX}_outcomes_created_total")).increment(1);
        tracing::info!(dose_group_id, outcome_id = outcome.id, "Outcome recorded");
        Ok(outcome)
    }

    /// The dose-group selection step: every group for the animal model.
    /// The route layer turns an empty list into a redirect back to
    /// dose-group creation.
    pub async fn dose_groups_for_selection(
        &self,
        animal_model_id: i32,
    ) -> Result<(AnimalModel, Vec<DoseGroup>)> {
        let model = self
            .repo
            .find_animal_model(animal_model_id)
            .await?
            .ok_or_else(|| AppError::not_found("animal_model", animal_model_id))?;
        let groups = self.repo.list_dose_groups(animal_model_id).await?;
        Ok((model, groups))
    }

    /// The full study view: owned tree plus every entity's metadata
    pub async fn study_detail(&self, study_id: i32) -> Result<StudyDetail> {
        let tree = self.repo.load_study_tree(study_id).await?;

        let study_meta = self.fetch_metadata(EntityKind::Study, tree.study.id).await?;
        let mut animal_models = Vec::new();
        for animal in tree.animals {
            let animal_meta = self
                .fetch_metadata(EntityKind::AnimalModel, animal.model.id)
                .await?;
            let mut dose_groups = Vec::new();
            for node in animal.dose_groups {
                let dose_meta = self
                    .fetch_metadata(EntityKind::DoseGroup, node.group.id)
                    .await?;
                let mut outcomes = Vec::new();
                for outcome in node.outcomes {
                    let outcome_meta =
                        self.fetch_metadata(EntityKind::Outcome, outcome.id).await?;
                    outcomes.push(OutcomeDetail {
                        outcome,
                        metadata: outcome_meta,
                    });
                }
                dose_groups.push(DoseGroupDetail {
                    group: node.group,
                    metadata: dose_meta,
                    outcomes,
                });
            }
            animal_models.push(AnimalModelDetail {
                model: animal.model,
                metadata: animal_meta,
                dose_groups,
            });
        }

        Ok(StudyDetail {
            study: StudySummary::from_parts(&tree.study, &tree.toxin.name),
            metadata: study_meta,
            animal_models,
        })
    }

    /// List studies newest first
    pub async fn list_studies(&self, limit: Option<u64>) -> Result<Vec<StudySummary>> {
        let studies = self.repo.list_studies(limit).await?;
        Ok(studies
            .into_iter()
            .map(|(study, toxin)| {
                let toxin_name = toxin.map(|t| t.name).unwrap_or_default();
                StudySummary::from_parts(&study, &toxin_name)
            })
            .collect())
    }

    /// The single exposed deletion path: the study and its whole subtree
    pub async fn delete_study(&self, study_id: i32) -> Result<()> {
        self.repo
            .find_study(study_id)
            .await?
            .ok_or_else(|| AppError::not_found("study", study_id))?;
        self.repo.delete_study_tree(study_id).await
    }

    async fn fetch_metadata(&self, kind: EntityKind, id: i32) -> Result<Vec<MetadataItem>> {
        Ok(self
            .repo
            .list_metadata(kind, id)
            .await?
            .into_iter()
            .map(MetadataItem::from)
            .collect())
    }

    /// Bulk metadata ingestion for a creation step: plain inserts, pairs
    /// with blank names skipped.
    async fn ingest_metadata(
        &self,
        kind: EntityKind,
        entity_id: i32,
        names: &[String],
        values: &[String],
    ) -> Result<()> {
        for (name, value) in metadata_pairs(names, values) {
            self.repo
                .insert_metadata(kind, entity_id, name, Some(value))
                .await?;
            metrics::counter!(format!("{METRICS_PREFIX}_metadata_rows_total")).increment(1);
        }
        Ok(())
    }
}

fn validator_error(errors: validator::ValidationErrors) -> AppError {
    AppError::Validation {
        message: errors.to_string(),
        field: errors.field_errors().keys().next().map(|k| k.to_string()),
        details: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_pairs_skips_blank_names() {
        let names = vec!["purity".to_string(), "".to_string(), "  ".to_string()];
        let values = vec!["99%".to_string(), "ignored".to_string(), "ignored".to_string()];
        assert_eq!(
            metadata_pairs(&names, &values),
            vec![("purity".to_string(), "99%".to_string())]
        );
    }

    #[test]
    fn metadata_pairs_drops_names_without_a_value() {
        let names = vec!["purity".to_string(), "vendor".to_string()];
        let values = vec!["99%".to_string()];
        assert_eq!(
            metadata_pairs(&names, &values),
            vec![("purity".to_string(), "99%".to_string())]
        );
    }

    #[test]
    fn metadata_pairs_keeps_duplicate_names() {
        // The bulk path does not deduplicate; the storage-layer unique
        // constraint is what rejects a repeated name.
        let names = vec!["purity".to_string(), "purity".to_string()];
        let values = vec!["99%".to_string(), "98%".to_string()];
        assert_eq!(metadata_pairs(&names, &values).len(), 2);
    }

    #[test]
    fn metadata_pairs_trims_names_and_values() {
        let names = vec![" purity ".to_string()];
        let values = vec![" 99% ".to_string()];
        assert_eq!(
            metadata_pairs(&names, &values),
            vec![("purity".to_string(), "99%".to_string())]
        );
    }
}
