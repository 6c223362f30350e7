//! Repository pattern for database operations
//!
//! Single access point for all reads and writes. Each method is one unit
//! of durability; the creation steps deliberately commit the primary row
//! and its metadata rows separately.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::db::models::*;
use crate::db::schema;
use crate::errors::{AppError, Result};
use crate::vocab::EntityKind;

/// A study with its full owned tree, loaded for export and detail views
#[derive(Debug, Clone)]
pub struct StudyTree {
    pub study: Study,
    pub toxin: Toxin,
    pub animals: Vec<AnimalNode>,
}

#[derive(Debug, Clone)]
pub struct AnimalNode {
    pub model: AnimalModel,
    pub dose_groups: Vec<DoseNode>,
}

#[derive(Debug, Clone)]
pub struct DoseNode {
    pub group: DoseGroup,
    pub outcomes: Vec<Outcome>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    db: Arc<DatabaseConnection>,
}

impl Repository {
    /// Connect to the database and bootstrap the schema
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let db = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to database: {e}"),
            })?;

        schema::init(&db).await?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Construct a repository over an existing connection
    pub fn with_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {e}"),
            })?;
        Ok(())
    }

    // ========================================================================
    // Toxin operations
    // ========================================================================

    /// Lookup-or-create by exact name; a new toxin gets an empty description.
    /// Idempotent: two studies naming the same toxin share one row.
    pub async fn find_or_create_toxin(&self, name: &str) -> Result<Toxin> {
        if let Some(toxin) = ToxinEntity::find()
            .filter(ToxinColumn::Name.eq(name))
            .one(&*self.db)
            .await?
        {
            return Ok(toxin);
        }

        let toxin = ToxinActiveModel {
            name: Set(name.to_owned()),
            description: Set(Some(String::new())),
            ..Default::default()
        };
        toxin.insert(&*self.db).await.map_err(Into::into)
    }

    pub async fn find_toxin(&self, id: i32) -> Result<Option<Toxin>> {
        ToxinEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Study operations
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_study(
        &self,
        name: String,
        toxin_id: i32,
        description: Option<String>,
        date_conducted: Option<chrono::NaiveDate>,
        author: Option<String>,
        contributor_name: Option<String>,
        contributor_email: String,
        publication_reference: Option<String>,
    ) -> Result<Study> {
        let study = StudyActiveModel {
            name: Set(name),
            toxin_id: Set(toxin_id),
            description: Set(description),
            date_conducted: Set(date_conducted),
            author: Set(author),
            contributor_name: Set(contributor_name),
            contributor_email: Set(contributor_email),
            publication_reference: Set(publication_reference),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        study.insert(&*self.db).await.map_err(Into::into)
    }

    pub async fn find_study(&self, id: i32) -> Result<Option<Study>> {
        StudyEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// List studies newest first, with their toxins
    pub async fn list_studies(&self, limit: Option<u64>) -> Result<Vec<(Study, Option<Toxin>)>> {
        let mut query = StudyEntity::find()
            .find_also_related(ToxinEntity)
            .order_by_desc(StudyColumn::CreatedAt);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        query.all(&*self.db).await.map_err(Into::into)
    }

    /// Delete a study and everything it owns. The cascade handles the
    /// entity tree; metadata rows reference entities by tagged (type, id)
    /// pairs without a foreign key, so they are collected and deleted
    /// explicitly before the owning rows go away.
    pub async fn delete_study_tree(&self, study_id: i32) -> Result<()> {
        let animal_ids: Vec<i32> = AnimalModelEntity::find()
            .filter(AnimalModelColumn::StudyId.eq(study_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let dose_ids: Vec<i32> = if animal_ids.is_empty() {
            Vec::new()
        } else {
            DoseGroupEntity::find()
                .filter(DoseGroupColumn::AnimalModelId.is_in(animal_ids.iter().copied()))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|g| g.id)
                .collect()
        };

        let outcome_ids: Vec<i32> = if dose_ids.is_empty() {
            Vec::new()
        } else {
            OutcomeEntity::find()
                .filter(OutcomeColumn::DoseGroupId.is_in(dose_ids.iter().copied()))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|o| o.id)
                .collect()
        };

        let mut orphan_filter = Condition::any().add(
            Condition::all()
                .add(MetadataColumn::EntityType.eq(EntityKind::Study.as_str()))
                .add(MetadataColumn::EntityId.eq(study_id)),
        );
        for (kind, ids) in [
            (EntityKind::AnimalModel, &animal_ids),
            (EntityKind::DoseGroup, &dose_ids),
            (EntityKind::Outcome, &outcome_ids),
        ] {
            if !ids.is_empty() {
                orphan_filter = orphan_filter.add(
                    Condition::all()
                        .add(MetadataColumn::EntityType.eq(kind.as_str()))
                        .add(MetadataColumn::EntityId.is_in(ids.iter().copied())),
                );
            }
        }

        let removed = MetadataEntity::delete_many()
            .filter(orphan_filter)
            .exec(&*self.db)
            .await?;

        StudyEntity::delete_by_id(study_id).exec(&*self.db).await?;

        tracing::info!(
            study_id,
            animal_models = animal_ids.len(),
            dose_groups = dose_ids.len(),
            outcomes = outcome_ids.len(),
            metadata_rows = removed.rows_affected,
            "Study deleted with owned subtree"
        );
        Ok(())
    }

    /// Load a study with its full owned tree for export and detail views
    pub async fn load_study_tree(&self, study_id: i32) -> Result<StudyTree> {
        let study = self
            .find_study(study_id)
            .await?
            .ok_or_else(|| AppError::not_found("study", study_id))?;

        let toxin = self
            .find_toxin(study.toxin_id)
            .await?
            .ok_or_else(|| AppError::not_found("toxin", study.toxin_id))?;

        let mut animals = Vec::new();
        for model in self.list_animal_models(study_id).await? {
            let mut dose_groups = Vec::new();
            for group in self.list_dose_groups(model.id).await? {
                let outcomes = self.list_outcomes(group.id).await?;
                dose_groups.push(DoseNode { group, outcomes });
            }
            animals.push(AnimalNode { model, dose_groups });
        }

        Ok(StudyTree {
            study,
            toxin,
            animals,
        })
    }

    // ========================================================================
    // AnimalModel operations
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_animal_model(
        &self,
        study_id: i32,
        species: String,
        strain: Option<String>,
        sex: String,
        age: Option<String>,
        weight: Option<String>,
        description: Option<String>,
    ) -> Result<AnimalModel> {
        let model = AnimalModelActiveModel {
            study_id: Set(study_id),
            species: Set(species),
            strain: Set(strain),
            sex: Set(sex),
            age: Set(age),
            weight: Set(weight),
            description: Set(description),
            ..Default::default()
        };
        model.insert(&*self.db).await.map_err(Into::into)
    }

    pub async fn find_animal_model(&self, id: i32) -> Result<Option<AnimalModel>> {
        AnimalModelEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn list_animal_models(&self, study_id: i32) -> Result<Vec<AnimalModel>> {
        AnimalModelEntity::find()
            .filter(AnimalModelColumn::StudyId.eq(study_id))
            .order_by_asc(AnimalModelColumn::Id)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // DoseGroup operations
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_dose_group(
        &self,
        animal_model_id: i32,
        dose_value: f64,
        dose_unit: String,
        custom_dose_unit: Option<String>,
        group_size: i32,
        exposure_duration: Option<String>,
        route_of_exposure: String,
    ) -> Result<DoseGroup> {
        let group = DoseGroupActiveModel {
            animal_model_id: Set(animal_model_id),
            dose_value: Set(dose_value),
            dose_unit: Set(dose_unit),
            custom_dose_unit: Set(custom_dose_unit),
            group_size: Set(group_size),
            exposure_duration: Set(exposure_duration),
            route_of_exposure: Set(route_of_exposure),
            ..Default::default()
        };
        group.insert(&*self.db).await.map_err(Into::into)
    }

    pub async fn find_dose_group(&self, id: i32) -> Result<Option<DoseGroup>> {
        DoseGroupEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn list_dose_groups(&self, animal_model_id: i32) -> Result<Vec<DoseGroup>> {
        DoseGroupEntity::find()
            .filter(DoseGroupColumn::AnimalModelId.eq(animal_model_id))
            .order_by_asc(DoseGroupColumn::Id)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Outcome operations
    // ========================================================================

    pub async fn create_outcome(
        &self,
        dose_group_id: i32,
        outcome_type: String,
        custom_outcome_type: Option<String>,
        value: String,
        observation_time: Option<String>,
        notes: Option<String>,
    ) -> Result<Outcome> {
        let outcome = OutcomeActiveModel {
            dose_group_id: Set(dose_group_id),
            outcome_type: Set(outcome_type),
            custom_outcome_type: Set(custom_outcome_type),
            value: Set(value),
            observation_time: Set(observation_time),
            notes: Set(notes),
            ..Default::default()
        };
        outcome.insert(&*self.db).await.map_err(Into::into)
    }

    pub async fn find_outcome(&self, id: i32) -> Result<Option<Outcome>> {
        OutcomeEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn list_outcomes(&self, dose_group_id: i32) -> Result<Vec<Outcome>> {
        OutcomeEntity::find()
            .filter(OutcomeColumn::DoseGroupId.eq(dose_group_id))
            .order_by_asc(OutcomeColumn::Id)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Metadata operations
    // ========================================================================

    /// Plain insert used by the creation steps' bulk ingestion path. The
    /// unique constraint on (entity_type, entity_id, field_name) backstops
    /// the one-row-per-field invariant at the storage layer.
    pub async fn insert_metadata(
        &self,
        kind: EntityKind,
        entity_id: i32,
        field_name: String,
        field_value: Option<String>,
    ) -> Result<Metadata> {
        let row = MetadataActiveModel {
            entity_type: Set(kind.as_str().to_owned()),
            entity_id: Set(entity_id),
            field_name: Set(field_name),
            field_value: Set(field_value),
            ..Default::default()
        };
        row.insert(&*self.db).await.map_err(Into::into)
    }

    /// Upsert on (entity_type, entity_id, field_name): overwrite the value
    /// in place when the triple exists, insert otherwise.
    pub async fn upsert_metadata(
        &self,
        kind: EntityKind,
        entity_id: i32,
        field_name: &str,
        field_value: Option<String>,
    ) -> Result<Metadata> {
        let existing = MetadataEntity::find()
            .filter(MetadataColumn::EntityType.eq(kind.as_str()))
            .filter(MetadataColumn::EntityId.eq(entity_id))
            .filter(MetadataColumn::FieldName.eq(field_name))
            .one(&*self.db)
            .await?;

        match existing {
            Some(row) => {
                let mut active: MetadataActiveModel = row.into();
                active.field_value = Set(field_value);
                active.update(&*self.db).await.map_err(Into::into)
            }
            None => {
                self.insert_metadata(kind, entity_id, field_name.to_owned(), field_value)
                    .await
            }
        }
    }

    pub async fn list_metadata(&self, kind: EntityKind, entity_id: i32) -> Result<Vec<Metadata>> {
        MetadataEntity::find()
            .filter(MetadataColumn::EntityType.eq(kind.as_str()))
            .filter(MetadataColumn::EntityId.eq(entity_id))
            .order_by_asc(MetadataColumn::Id)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    /// `DatabaseConnection` is not `Clone` with the `mock` feature enabled;
    /// share the underlying mock connection so the transaction log stays
    /// observable after handing a connection to the repository.
    fn share(db: &DatabaseConnection) -> DatabaseConnection {
        match db {
            DatabaseConnection::MockDatabaseConnection(conn) => {
                DatabaseConnection::MockDatabaseConnection(conn.clone())
            }
            _ => unreachable!("tests only use the mock backend"),
        }
    }

    fn toxin(id: i32, name: &str) -> Toxin {
        Toxin {
            id,
            name: name.to_owned(),
            description: Some(String::new()),
        }
    }

    fn metadata_row(id: i32, value: Option<&str>) -> Metadata {
        Metadata {
            id,
            entity_type: "study".to_owned(),
            entity_id: 1,
            field_name: "purity".to_owned(),
            field_value: value.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn find_or_create_toxin_reuses_an_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![toxin(7, "Benzene")]])
            .into_connection();
        let repo = Repository::with_connection(share(&db));

        let found = repo.find_or_create_toxin("Benzene").await.unwrap();
        assert_eq!(found.id, 7);

        // A hit issues the lookup and nothing else.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(format!("{:?}", log[0]).contains("SELECT"));
    }

    #[tokio::test]
    async fn find_or_create_toxin_inserts_when_the_name_is_new() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Toxin>::new(), vec![toxin(8, "Toluene")]])
            .into_connection();
        let repo = Repository::with_connection(share(&db));

        let created = repo.find_or_create_toxin("Toluene").await.unwrap();
        assert_eq!(created.name, "Toluene");
        assert_eq!(created.description.as_deref(), Some(""));

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("INSERT"));
    }

    #[tokio::test]
    async fn upsert_metadata_overwrites_the_existing_triple() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![metadata_row(3, Some("99%"))],
                vec![metadata_row(3, Some("98%"))],
            ])
            .into_connection();
        let repo = Repository::with_connection(share(&db));

        let row = repo
            .upsert_metadata(EntityKind::Study, 1, "purity", Some("98%".to_owned()))
            .await
            .unwrap();
        assert_eq!(row.id, 3);
        assert_eq!(row.field_value.as_deref(), Some("98%"));

        // The repeated triple updates in place instead of inserting.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("UPDATE"));
    }

    #[tokio::test]
    async fn upsert_metadata_inserts_when_the_triple_is_new() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Metadata>::new(), vec![metadata_row(4, Some("99%"))]])
            .into_connection();
        let repo = Repository::with_connection(share(&db));

        let row = repo
            .upsert_metadata(EntityKind::Study, 1, "purity", Some("99%".to_owned()))
            .await
            .unwrap();
        assert_eq!(row.field_value.as_deref(), Some("99%"));

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("INSERT"));
    }

    #[tokio::test]
    async fn delete_study_tree_sweeps_metadata_before_the_cascade() {
        let animal = AnimalModel {
            id: 2,
            study_id: 1,
            species: "Rat".to_owned(),
            strain: None,
            sex: "male".to_owned(),
            age: None,
            weight: None,
            description: None,
        };
        let group = DoseGroup {
            id: 3,
            animal_model_id: 2,
            dose_value: 5.0,
            dose_unit: "ppm".to_owned(),
            custom_dose_unit: None,
            group_size: 10,
            exposure_duration: None,
            route_of_exposure: "oral".to_owned(),
        };
        let outcome = Outcome {
            id: 4,
            dose_group_id: 3,
            outcome_type: "cancer".to_owned(),
            custom_outcome_type: None,
            value: "3".to_owned(),
            observation_time: None,
            notes: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![animal]])
            .append_query_results([vec![group]])
            .append_query_results([vec![outcome]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 5,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let repo = Repository::with_connection(share(&db));

        repo.delete_study_tree(1).await.unwrap();

        // Three owned-id lookups, the metadata sweep, the study delete.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 5);

        let sweep = format!("{:?}", log[3]);
        assert!(sweep.contains("DELETE"));
        assert!(sweep.contains("additional_metadata"));
        for kind in ["study", "animal_model", "dose_group", "outcome"] {
            assert!(sweep.contains(kind), "metadata sweep misses {kind} rows");
        }

        assert!(format!("{:?}", log[4]).contains("studies"));
    }

    #[tokio::test]
    async fn delete_study_tree_handles_a_study_with_no_animals() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<AnimalModel>::new()])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let repo = Repository::with_connection(share(&db));

        repo.delete_study_tree(9).await.unwrap();

        // No dose-group or outcome lookups; the study's own metadata is
        // still swept before the row goes away.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        assert!(format!("{:?}", log[1]).contains("additional_metadata"));
    }
}
