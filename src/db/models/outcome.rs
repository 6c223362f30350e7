//! Outcome entity
//!
//! One measured result recorded against a dose group.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outcomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub dose_group_id: i32,

    /// Controlled: cancer, organ_weight, mortality, other
    #[sea_orm(column_type = "Text")]
    pub outcome_type: String,

    /// Set exactly when outcome_type is "other"
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_outcome_type: Option<String>,

    /// Free text; tumor counts are validated before storage but stored
    /// as text like every other value.
    #[sea_orm(column_type = "Text")]
    pub value: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub observation_time: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dose_group::Entity",
        from = "Column::DoseGroupId",
        to = "super::dose_group::Column::Id"
    )]
    DoseGroup,
}

impl Related<super::dose_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DoseGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
