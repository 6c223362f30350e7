//! Schema bootstrap
//!
//! Creates the five entity tables and the metadata side table on startup.
//! Ownership is enforced in the database: each parent deletes its owned
//! subtree via ON DELETE CASCADE. Metadata rows reference entities by a
//! tagged (entity_type, entity_id) pair, so they carry no foreign key and
//! are cleaned up explicitly when a study is deleted.

use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::errors::Result;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS toxins (
        id          SERIAL PRIMARY KEY,
        name        TEXT NOT NULL UNIQUE,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS studies (
        id                    SERIAL PRIMARY KEY,
        name                  TEXT NOT NULL,
        toxin_id              INTEGER NOT NULL REFERENCES toxins(id),
        description           TEXT,
        date_conducted        DATE,
        author                TEXT,
        contributor_name      TEXT,
        contributor_email     TEXT NOT NULL,
        publication_reference TEXT,
        created_at            TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS animal_models (
        id          SERIAL PRIMARY KEY,
        study_id    INTEGER NOT NULL REFERENCES studies(id) ON DELETE CASCADE,
        species     TEXT NOT NULL,
        strain      TEXT,
        sex         TEXT NOT NULL,
        age         TEXT,
        weight      TEXT,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dose_groups (
        id                SERIAL PRIMARY KEY,
        animal_model_id   INTEGER NOT NULL REFERENCES animal_models(id) ON DELETE CASCADE,
        dose_value        DOUBLE PRECISION NOT NULL,
        dose_unit         TEXT NOT NULL,
        custom_dose_unit  TEXT,
        group_size        INTEGER NOT NULL,
        exposure_duration TEXT,
        route_of_exposure TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS outcomes (
        id                  SERIAL PRIMARY KEY,
        dose_group_id       INTEGER NOT NULL REFERENCES dose_groups(id) ON DELETE CASCADE,
        outcome_type        TEXT NOT NULL,
        custom_outcome_type TEXT,
        value               TEXT NOT NULL,
        observation_time    TEXT,
        notes               TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS additional_metadata (
        id          SERIAL PRIMARY KEY,
        entity_type TEXT NOT NULL,
        entity_id   INTEGER NOT NULL,
        field_name  TEXT NOT NULL,
        field_value TEXT,
        CONSTRAINT unique_metadata_field UNIQUE (entity_type, entity_id, field_name)
    )
    "#,
];

/// Create any missing tables
pub async fn init(conn: &DatabaseConnection) -> Result<()> {
    for ddl in TABLES {
        conn.execute_unprepared(ddl).await?;
    }
    tracing::info!(tables = TABLES.len(), "Schema bootstrap complete");
    Ok(())
}
