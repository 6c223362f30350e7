//! Controlled vocabularies and their domain types
//!
//! The four vocabularies consumed by forms and export are immutable
//! `const` (value, label) tables. Fields that allow an "other" choice
//! with a free-text override are modeled as sum types with a single
//! resolution function used by both storage and export.

use serde::Serialize;

use crate::errors::AppError;

pub const SEX_CHOICES: &[(&str, &str)] =
    &[("male", "Male"), ("female", "Female"), ("mixed", "Mixed")];

pub const DOSE_UNIT_CHOICES: &[(&str, &str)] = &[
    ("mg/m3", "mg/m3"),
    ("ppm", "ppm"),
    ("ppb", "ppb"),
    ("other", "Other"),
];

pub const OUTCOME_TYPE_CHOICES: &[(&str, &str)] = &[
    ("cancer", "Cancer Incidence"),
    ("organ_weight", "Organ Weight Change"),
    ("mortality", "Mortality"),
    ("other", "Other"),
];

pub const ROUTE_CHOICES: &[(&str, &str)] = &[
    ("oral", "Oral"),
    ("inhalation", "Inhalation"),
    ("dermal", "Dermal"),
    ("intraperitoneal", "Intraperitoneal"),
    ("other", "Other / Mixed"),
];

/// Display label for a vocabulary value, falling back to the raw value
/// (resolved custom text has no table entry).
pub fn label_for<'a>(choices: &'a [(&'a str, &'a str)], value: &'a str) -> &'a str {
    choices
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

/// Animal cohort sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Mixed,
}

impl Sex {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "mixed" => Ok(Sex::Mixed),
            other => Err(AppError::validation(
                format!("sex must be one of male, female, mixed (got '{other}')"),
                "sex",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Mixed => "mixed",
        }
    }
}

/// Dose unit with a free-text override for the "other" choice.
///
/// Stored as the discriminant plus a custom column; resolved to a single
/// display string at export time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoseUnit {
    MgM3,
    Ppm,
    Ppb,
    Custom(String),
}

impl DoseUnit {
    /// Parse a submitted (dose_unit, custom_dose_unit) pair. The custom
    /// text is required exactly when the choice is "other".
    pub fn from_submission(value: &str, custom: Option<&str>) -> Result<Self, AppError> {
        match value {
            "mg/m3" => Ok(DoseUnit::MgM3),
            "ppm" => Ok(DoseUnit::Ppm),
            "ppb" => Ok(DoseUnit::Ppb),
            "other" => match custom.map(str::trim) {
                Some(text) if !text.is_empty() => Ok(DoseUnit::Custom(text.to_string())),
                _ => Err(AppError::validation(
                    "custom_dose_unit is required when dose_unit is 'other'",
                    "custom_dose_unit",
                )),
            },
            other => Err(AppError::validation(
                format!("dose_unit must be one of mg/m3, ppm, ppb, other (got '{other}')"),
                "dose_unit",
            )),
        }
    }

    /// Rehydrate from the stored (dose_unit, custom_dose_unit) columns.
    pub fn from_stored(value: &str, custom: Option<&str>) -> Self {
        if value == "other" {
            DoseUnit::Custom(custom.unwrap_or_default().to_string())
        } else {
            Self::from_submission(value, None).unwrap_or_else(|_| DoseUnit::Custom(value.to_string()))
        }
    }

    /// The (dose_unit, custom_dose_unit) column values.
    pub fn stored(&self) -> (&str, Option<&str>) {
        match self {
            DoseUnit::MgM3 => ("mg/m3", None),
            DoseUnit::Ppm => ("ppm", None),
            DoseUnit::Ppb => ("ppb", None),
            DoseUnit::Custom(text) => ("other", Some(text.as_str())),
        }
    }

    /// The single display/export string, custom text substituted.
    pub fn resolved(&self) -> &str {
        match self {
            DoseUnit::Custom(text) => text.as_str(),
            known => known.stored().0,
        }
    }
}

/// Outcome type with a free-text override for the "other" choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeType {
    Cancer,
    OrganWeight,
    Mortality,
    Custom(String),
}

impl OutcomeType {
    pub fn from_submission(value: &str, custom: Option<&str>) -> Result<Self, AppError> {
        match value {
            "cancer" => Ok(OutcomeType::Cancer),
            "organ_weight" => Ok(OutcomeType::OrganWeight),
            "mortality" => Ok(OutcomeType::Mortality),
            "other" => match custom.map(str::trim) {
                Some(text) if !text.is_empty() => Ok(OutcomeType::Custom(text.to_string())),
                _ => Err(AppError::validation(
                    "custom_outcome_type is required when outcome_type is 'other'",
                    "custom_outcome_type",
                )),
            },
            other => Err(AppError::validation(
                format!(
                    "outcome_type must be one of cancer, organ_weight, mortality, other (got '{other}')"
                ),
                "outcome_type",
            )),
        }
    }

    pub fn from_stored(value: &str, custom: Option<&str>) -> Self {
        if value == "other" {
            OutcomeType::Custom(custom.unwrap_or_default().to_string())
        } else {
            Self::from_submission(value, None)
                .unwrap_or_else(|_| OutcomeType::Custom(value.to_string()))
        }
    }

    pub fn stored(&self) -> (&str, Option<&str>) {
        match self {
            OutcomeType::Cancer => ("cancer", None),
            OutcomeType::OrganWeight => ("organ_weight", None),
            OutcomeType::Mortality => ("mortality", None),
            OutcomeType::Custom(text) => ("other", Some(text.as_str())),
        }
    }

    pub fn resolved(&self) -> &str {
        match self {
            OutcomeType::Custom(text) => text.as_str(),
            known => known.stored().0,
        }
    }

    pub fn is_cancer(&self) -> bool {
        matches!(self, OutcomeType::Cancer)
    }
}

/// Route of exposure. Unlike dose unit and outcome type, the custom text
/// replaces the enum value at storage time: the stored column is the
/// resolved string and never the literal "other".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOfExposure {
    Oral,
    Inhalation,
    Dermal,
    Intraperitoneal,
    Custom(String),
}

impl RouteOfExposure {
    pub fn from_submission(value: &str, custom: Option<&str>) -> Result<Self, AppError> {
        match value {
            "oral" => Ok(RouteOfExposure::Oral),
            "inhalation" => Ok(RouteOfExposure::Inhalation),
            "dermal" => Ok(RouteOfExposure::Dermal),
            "intraperitoneal" => Ok(RouteOfExposure::Intraperitoneal),
            "other" => match custom.map(str::trim) {
                Some(text) if !text.is_empty() => Ok(RouteOfExposure::Custom(text.to_string())),
                _ => Err(AppError::validation(
                    "custom_route is required when route_of_exposure is 'other'",
                    "custom_route",
                )),
            },
            other => Err(AppError::validation(
                format!(
                    "route_of_exposure must be one of oral, inhalation, dermal, \
                     intraperitoneal, other (got '{other}')"
                ),
                "route_of_exposure",
            )),
        }
    }

    /// The stored column value: the resolved string.
    pub fn resolved(&self) -> &str {
        match self {
            RouteOfExposure::Oral => "oral",
            RouteOfExposure::Inhalation => "inhalation",
            RouteOfExposure::Dermal => "dermal",
            RouteOfExposure::Intraperitoneal => "intraperitoneal",
            RouteOfExposure::Custom(text) => text.as_str(),
        }
    }
}

/// The four entity kinds the metadata table can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Study,
    AnimalModel,
    DoseGroup,
    Outcome,
}

impl EntityKind {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "study" => Ok(EntityKind::Study),
            "animal_model" => Ok(EntityKind::AnimalModel),
            "dose_group" => Ok(EntityKind::DoseGroup),
            "outcome" => Ok(EntityKind::Outcome),
            other => Err(AppError::validation(
                format!("invalid entity type '{other}'"),
                "entity_type",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Study => "study",
            EntityKind::AnimalModel => "animal_model",
            EntityKind::DoseGroup => "dose_group",
            EntityKind::Outcome => "outcome",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dose_unit_other_requires_custom_text() {
        assert!(DoseUnit::from_submission("other", None).is_err());
        assert!(DoseUnit::from_submission("other", Some("  ")).is_err());
        let unit = DoseUnit::from_submission("other", Some("mg/kg/day")).unwrap();
        assert_eq!(unit.stored(), ("other", Some("mg/kg/day")));
        assert_eq!(unit.resolved(), "mg/kg/day");
    }

    #[test]
    fn dose_unit_known_values_resolve_to_themselves() {
        let unit = DoseUnit::from_submission("ppm", None).unwrap();
        assert_eq!(unit.stored(), ("ppm", None));
        assert_eq!(unit.resolved(), "ppm");
        assert!(DoseUnit::from_submission("grams", None).is_err());
    }

    #[test]
    fn route_other_stores_resolved_text_never_the_literal() {
        let route = RouteOfExposure::from_submission("other", Some("nasal instillation")).unwrap();
        assert_eq!(route.resolved(), "nasal instillation");

        let route = RouteOfExposure::from_submission("inhalation", None).unwrap();
        assert_eq!(route.resolved(), "inhalation");
    }

    #[test]
    fn outcome_type_round_trips_through_storage() {
        let custom = OutcomeType::from_submission("other", Some("behavioral change")).unwrap();
        let (stored, extra) = custom.stored();
        assert_eq!(OutcomeType::from_stored(stored, extra).resolved(), "behavioral change");

        let cancer = OutcomeType::from_submission("cancer", None).unwrap();
        assert!(cancer.is_cancer());
        assert_eq!(OutcomeType::from_stored("cancer", None), cancer);
    }

    #[test]
    fn entity_kind_rejects_unknown_types() {
        assert!(EntityKind::parse("toxin").is_err());
        assert_eq!(EntityKind::parse("dose_group").unwrap().as_str(), "dose_group");
    }

    #[test]
    fn labels_fall_back_to_raw_value() {
        assert_eq!(label_for(OUTCOME_TYPE_CHOICES, "cancer"), "Cancer Incidence");
        assert_eq!(label_for(ROUTE_CHOICES, "nasal instillation"), "nasal instillation");
        assert_eq!(label_for(SEX_CHOICES, "female"), "Female");
    }
}
