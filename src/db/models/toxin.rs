//! Toxin entity
//!
//! The substance under study, shared across studies and never deleted by
//! this workflow.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "toxins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::study::Entity")]
    Studies,
}

impl Related<super::study::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Studies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
