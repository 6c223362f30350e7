//! SeaORM entity models
//!
//! The five persisted entity kinds plus the polymorphic metadata table.

mod animal_model;
mod dose_group;
mod metadata;
mod outcome;
mod study;
mod toxin;

pub use toxin::{
    ActiveModel as ToxinActiveModel, Column as ToxinColumn, Entity as ToxinEntity, Model as Toxin,
};

pub use study::{
    ActiveModel as StudyActiveModel, Column as StudyColumn, Entity as StudyEntity, Model as Study,
};

pub use animal_model::{
    ActiveModel as AnimalModelActiveModel, Column as AnimalModelColumn,
    Entity as AnimalModelEntity, Model as AnimalModel,
};

pub use dose_group::{
    ActiveModel as DoseGroupActiveModel, Column as DoseGroupColumn, Entity as DoseGroupEntity,
    Model as DoseGroup,
};

pub use outcome::{
    ActiveModel as OutcomeActiveModel, Column as OutcomeColumn, Entity as OutcomeEntity,
    Model as Outcome,
};

pub use metadata::{
    ActiveModel as MetadataActiveModel, Column as MetadataColumn, Entity as MetadataEntity,
    Model as Metadata,
};
