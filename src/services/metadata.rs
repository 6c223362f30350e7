//! Generic metadata attachment
//!
//! The one entity-agnostic mutation path: upsert a named value against
//! any of the four main entity kinds, keyed by (entity_type, entity_id,
//! field_name). Unlike the creation steps' bulk ingestion, this path
//! enforces the one-row-per-field invariant by overwriting in place.

use crate::db::models::Metadata;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics::METRICS_PREFIX;
use crate::vocab::EntityKind;

pub struct MetadataService {
    repo: Repository,
}

impl MetadataService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Upsert one metadata field. The entity must exist; the returned id
    /// is the study owning the entity, resolved by walking up the tree,
    /// so the client can navigate back to the study view.
    pub async fn upsert(
        &self,
        kind: EntityKind,
        entity_id: i32,
        field_name: &str,
        field_value: Option<String>,
    ) -> Result<(Metadata, i32)> {
        let study_id = self.owning_study_id(kind, entity_id).await?;

        let field_name = field_name.trim();
        if field_name.is_empty() {
            return Err(AppError::MissingField {
                field: "field_name".to_owned(),
            });
        }

        let row = self
            .repo
            .upsert_metadata(kind, entity_id, field_name, field_value)
            .await?;

        metrics::counter!(format!("{METRICS_PREFIX}_metadata_rows_total")).increment(1);
        tracing::info!(
            entity_type = kind.as_str(),
            entity_id,
            field_name,
            study_id,
            "Metadata saved"
        );
        Ok((row, study_id))
    }

    /// Resolve the study that owns an entity, erroring with not-found
    /// when the entity itself does not exist.
    async fn owning_study_id(&self, kind: EntityKind, entity_id: i32) -> Result<i32> {
        match kind {
            EntityKind::Study => {
                let study = self
                    .repo
                    .find_study(entity_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("study", entity_id))?;
                Ok(study.id)
            }
            EntityKind::AnimalModel => {
                let model = self
                    .repo
                    .find_animal_model(entity_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("animal_model", entity_id))?;
                Ok(model.study_id)
            }
            EntityKind::DoseGroup => {
                let group = self
                    .repo
                    .find_dose_group(entity_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("dose_group", entity_id))?;
                let model = self
                    .repo
                    .find_animal_model(group.animal_model_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("animal_model", group.animal_model_id))?;
                Ok(model.study_id)
            }
            EntityKind::Outcome => {
                let outcome = self
                    .repo
                    .find_outcome(entity_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("outcome", entity_id))?;
                let group = self
                    .repo
                    .find_dose_group(outcome.dose_group_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("dose_group", outcome.dose_group_id))?;
                let model = self
                    .repo
                    .find_animal_model(group.animal_model_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("animal_model", group.animal_model_id))?;
                Ok(model.study_id)
            }
        }
    }
}
