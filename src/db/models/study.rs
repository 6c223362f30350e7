//! Study entity
//!
//! One research record investigating a toxin, with provenance and contact
//! details. Strictly owns its animal models (cascade delete).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "studies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub toxin_id: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub date_conducted: Option<Date>,

    #[sea_orm(column_type = "Text", nullable)]
    pub author: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub contributor_name: Option<String>,

    /// Kept out of rendered views; exports carry contributor_name only.
    #[sea_orm(column_type = "Text")]
    pub contributor_email: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub publication_reference: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::toxin::Entity",
        from = "Column::ToxinId",
        to = "super::toxin::Column::Id"
    )]
    Toxin,

    #[sea_orm(has_many = "super::animal_model::Entity")]
    AnimalModels,
}

impl Related<super::toxin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Toxin.def()
    }
}

impl Related<super::animal_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnimalModels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
