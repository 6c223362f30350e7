//! AdditionalMetadata entity
//!
//! Free-form named values attached to any of the four main entity kinds
//! through a tagged (entity_type, entity_id) reference. At most one row
//! may exist per (entity_type, entity_id, field_name) triple.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "additional_metadata")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Controlled: study, animal_model, dose_group, outcome
    #[sea_orm(column_type = "Text")]
    pub entity_type: String,

    pub entity_id: i32,

    #[sea_orm(column_type = "Text")]
    pub field_name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub field_value: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
