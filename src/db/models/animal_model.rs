//! AnimalModel entity
//!
//! One experimental animal cohort within a study. Owns its dose groups.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "animal_models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub study_id: i32,

    #[sea_orm(column_type = "Text")]
    pub species: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub strain: Option<String>,

    /// Controlled: male, female, mixed
    #[sea_orm(column_type = "Text")]
    pub sex: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub age: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub weight: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::study::Entity",
        from = "Column::StudyId",
        to = "super::study::Column::Id"
    )]
    Study,

    #[sea_orm(has_many = "super::dose_group::Entity")]
    DoseGroups,
}

impl Related<super::study::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Study.def()
    }
}

impl Related<super::dose_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DoseGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
