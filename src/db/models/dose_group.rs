//! DoseGroup entity
//!
//! One exposure-level cohort within an animal model. Owns its outcomes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dose_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub animal_model_id: i32,

    pub dose_value: f64,

    /// Controlled: mg/m3, ppm, ppb, other
    #[sea_orm(column_type = "Text")]
    pub dose_unit: String,

    /// Set exactly when dose_unit is "other"
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_dose_unit: Option<String>,

    pub group_size: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub exposure_duration: Option<String>,

    /// Stored resolved: a vocabulary value or the custom override text,
    /// never the literal "other".
    #[sea_orm(column_type = "Text")]
    pub route_of_exposure: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::animal_model::Entity",
        from = "Column::AnimalModelId",
        to = "super::animal_model::Column::Id"
    )]
    AnimalModel,

    #[sea_orm(has_many = "super::outcome::Entity")]
    Outcomes,
}

impl Related<super::animal_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnimalModel.def()
    }
}

impl Related<super::outcome::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Outcomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
