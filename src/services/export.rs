//! Export/flatten module
//!
//! Walks a study's owned tree and emits one flattened row per
//! (AnimalModel, DoseGroup, Outcome) combination, substituting the
//! custom-unit and custom-type overrides. Two renderings of the same
//! traversal: a downloadable CSV with a fixed header, and structured
//! rows (a display subset) for in-page use.

use serde::Serialize;

use crate::db::{Repository, StudyTree};
use crate::errors::{AppError, Result};
use crate::metrics::METRICS_PREFIX;
use crate::vocab::{label_for, DoseUnit, OutcomeType, OUTCOME_TYPE_CHOICES, SEX_CHOICES};

/// CSV header, fixed by the export contract
pub const CSV_HEADER: [&str; 20] = [
    "Study ID",
    "Study Name",
    "Toxin",
    "Date Conducted",
    "Author",
    "Contributor",
    "Animal Species",
    "Strain",
    "Sex",
    "Age",
    "Weight",
    "Dose Value",
    "Dose Unit",
    "Route of Exposure",
    "Group Size",
    "Exposure Duration",
    "Outcome Type",
    "Outcome Value",
    "Observation Time",
    "Notes",
];

/// One fully flattened (AnimalModel, DoseGroup, Outcome) row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub study_id: i32,
    pub study_name: String,
    pub toxin: String,
    pub date_conducted: String,
    pub author: String,
    pub contributor: String,
    pub animal_species: String,
    pub strain: String,
    pub sex: String,
    pub age: String,
    pub weight: String,
    pub dose_value: f64,
    pub dose_unit: String,
    pub route_of_exposure: String,
    pub group_size: i32,
    pub exposure_duration: String,
    pub outcome_type: String,
    pub outcome_value: String,
    pub observation_time: String,
    pub notes: String,
}

/// The display subset used by the in-page long-format view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub animal_species: String,
    pub animal_strain: String,
    pub animal_sex: String,
    pub dose_value: f64,
    pub dose_unit: String,
    pub group_size: i32,
    pub outcome_type: String,
    pub outcome_value: String,
    pub observation_time: String,
}

/// Flatten a study tree into long-format rows. A study with A animal
/// models, each with D dose groups, each with O outcomes yields the sum
/// of the per-branch products; an empty branch contributes zero rows.
pub fn flatten(tree: &StudyTree) -> Vec<FlatRow> {
    let study = &tree.study;
    let date_conducted = study
        .date_conducted
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for animal in &tree.animals {
        let model = &animal.model;
        for node in &animal.dose_groups {
            let group = &node.group;
            let dose_unit =
                DoseUnit::from_stored(&group.dose_unit, group.custom_dose_unit.as_deref());

            for outcome in &node.outcomes {
                let outcome_type = OutcomeType::from_stored(
                    &outcome.outcome_type,
                    outcome.custom_outcome_type.as_deref(),
                );

                rows.push(FlatRow {
                    study_id: study.id,
                    study_name: study.name.clone(),
                    toxin: tree.toxin.name.clone(),
                    date_conducted: date_conducted.clone(),
                    author: study.author.clone().unwrap_or_default(),
                    contributor: study.contributor_name.clone().unwrap_or_default(),
                    animal_species: model.species.clone(),
                    strain: model.strain.clone().unwrap_or_default(),
                    sex: model.sex.clone(),
                    age: model.age.clone().unwrap_or_default(),
                    weight: model.weight.clone().unwrap_or_default(),
                    dose_value: group.dose_value,
                    dose_unit: dose_unit.resolved().to_owned(),
                    route_of_exposure: group.route_of_exposure.clone(),
                    group_size: group.group_size,
                    exposure_duration: group.exposure_duration.clone().unwrap_or_default(),
                    outcome_type: outcome_type.resolved().to_owned(),
                    outcome_value: outcome.value.clone(),
                    observation_time: outcome.observation_time.clone().unwrap_or_default(),
                    notes: outcome.notes.clone().unwrap_or_default(),
                });
            }
        }
    }
    rows
}

/// The same traversal reduced to the display subset. Sex and outcome
/// type carry their vocabulary labels here; resolved custom text has no
/// table entry and passes through unchanged.
pub fn long_rows(tree: &StudyTree) -> Vec<LongRow> {
    flatten(tree)
        .into_iter()
        .map(|row| LongRow {
            animal_species: row.animal_species,
            animal_strain: row.strain,
            animal_sex: label_for(SEX_CHOICES, &row.sex).to_owned(),
            dose_value: row.dose_value,
            dose_unit: row.dose_unit,
            group_size: row.group_size,
            outcome_type: label_for(OUTCOME_TYPE_CHOICES, &row.outcome_type).to_owned(),
            outcome_value: row.outcome_value,
            observation_time: row.observation_time,
        })
        .collect()
}

/// Serialize flattened rows as CSV with the fixed header
pub fn to_csv(rows: &[FlatRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.study_id.to_string(),
                row.study_name.clone(),
                row.toxin.clone(),
                row.date_conducted.clone(),
                row.author.clone(),
                row.contributor.clone(),
                row.animal_species.clone(),
                row.strain.clone(),
                row.sex.clone(),
                row.age.clone(),
                row.weight.clone(),
                row.dose_value.to_string(),
                row.dose_unit.clone(),
                row.route_of_exposure.clone(),
                row.group_size.to_string(),
                row.exposure_duration.clone(),
                row.outcome_type.clone(),
                row.outcome_value.clone(),
                row.observation_time.clone(),
                row.notes.clone(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal {
            message: format!("CSV writer flush failed: {e}"),
        })?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal {
        message: format!("CSV output was not UTF-8: {e}"),
    })
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal {
        message: format!("CSV serialization failed: {e}"),
    }
}

/// Export service: loads the tree and renders it
pub struct ExportService {
    repo: Repository,
}

impl ExportService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// The CSV rendering for download
    pub async fn study_csv(&self, study_id: i32) -> Result<String> {
        let tree = self.repo.load_study_tree(study_id).await?;
        let rows = flatten(&tree);
        let csv = to_csv(&rows)?;

        metrics::counter!(format!("{METRICS_PREFIX}_exports_total")).increment(1);
        tracing::info!(study_id, rows = rows.len(), "Study exported");
        Ok(csv)
    }

    /// The structured rendering for in-page display
    pub async fn study_long_rows(&self, study_id: i32) -> Result<Vec<LongRow>> {
        let tree = self.repo.load_study_tree(study_id).await?;
        Ok(long_rows(&tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AnimalModel, DoseGroup, Outcome, Study, Toxin};
    use crate::db::{AnimalNode, DoseNode};

    fn study(id: i32) -> Study {
        Study {
            id,
            name: "Chronic inhalation study".to_string(),
            toxin_id: 1,
            description: None,
            date_conducted: chrono::NaiveDate::from_ymd_opt(2023, 6, 15),
            author: Some("Doe J".to_string()),
            contributor_name: Some("Jane Doe".to_string()),
            contributor_email: "a@state.edu".to_string(),
            publication_reference: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn animal(id: i32) -> AnimalModel {
        AnimalModel {
            id,
            study_id: 1,
            species: "Rat".to_string(),
            strain: Some("Wistar".to_string()),
            sex: "male".to_string(),
            age: None,
            weight: None,
            description: None,
        }
    }

    fn dose_group(id: i32, unit: &str, custom: Option<&str>) -> DoseGroup {
        DoseGroup {
            id,
            animal_model_id: 1,
            dose_value: 5.0,
            dose_unit: unit.to_string(),
            custom_dose_unit: custom.map(str::to_string),
            group_size: 10,
            exposure_duration: Some("6h/day".to_string()),
            route_of_exposure: "inhalation".to_string(),
        }
    }

    fn outcome(id: i32, kind: &str, custom: Option<&str>, value: &str) -> Outcome {
        Outcome {
            id,
            dose_group_id: 1,
            outcome_type: kind.to_string(),
            custom_outcome_type: custom.map(str::to_string),
            value: value.to_string(),
            observation_time: Some("24 months".to_string()),
            notes: None,
        }
    }

    fn tree_with(animals: Vec<AnimalNode>) -> StudyTree {
        StudyTree {
            study: study(1),
            toxin: Toxin {
                id: 1,
                name: "Benzene".to_string(),
                description: Some(String::new()),
            },
            animals,
        }
    }

    #[test]
    fn flatten_emits_one_row_per_triple() {
        let tree = tree_with(vec![AnimalNode {
            model: animal(1),
            dose_groups: vec![
                DoseNode {
                    group: dose_group(1, "ppm", None),
                    outcomes: vec![
                        outcome(1, "cancer", None, "3"),
                        outcome(2, "mortality", None, "2/10"),
                    ],
                },
                DoseNode {
                    group: dose_group(2, "ppb", None),
                    outcomes: vec![outcome(3, "cancer", None, "0")],
                },
            ],
        }]);

        let rows = flatten(&tree);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].dose_unit, "ppm");
        assert_eq!(rows[0].outcome_type, "cancer");
        assert_eq!(rows[0].route_of_exposure, "inhalation");
        assert_eq!(rows[2].dose_unit, "ppb");
    }

    #[test]
    fn flatten_substitutes_custom_unit_and_type() {
        let tree = tree_with(vec![AnimalNode {
            model: animal(1),
            dose_groups: vec![DoseNode {
                group: dose_group(1, "other", Some("mg/kg/day")),
                outcomes: vec![outcome(1, "other", Some("behavioral change"), "observed")],
            }],
        }]);

        let rows = flatten(&tree);
        assert_eq!(rows[0].dose_unit, "mg/kg/day");
        assert_eq!(rows[0].outcome_type, "behavioral change");
    }

    #[test]
    fn empty_branches_contribute_zero_rows() {
        // An animal model with no dose groups, and a dose group with no
        // outcomes, both flatten to nothing without error.
        let tree = tree_with(vec![
            AnimalNode {
                model: animal(1),
                dose_groups: vec![],
            },
            AnimalNode {
                model: animal(2),
                dose_groups: vec![DoseNode {
                    group: dose_group(1, "ppm", None),
                    outcomes: vec![],
                }],
            },
        ]);

        assert!(flatten(&tree).is_empty());

        let empty_study = tree_with(vec![]);
        assert!(flatten(&empty_study).is_empty());
    }

    #[test]
    fn csv_has_the_fixed_header_and_expected_cells() {
        let tree = tree_with(vec![AnimalNode {
            model: animal(1),
            dose_groups: vec![DoseNode {
                group: dose_group(1, "ppm", None),
                outcomes: vec![outcome(1, "cancer", None, "3")],
            }],
        }]);

        let csv = to_csv(&flatten(&tree)).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert_eq!(header, CSV_HEADER.join(","));

        let row = lines.next().unwrap();
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells[0], "1");
        assert_eq!(cells[2], "Benzene");
        assert_eq!(cells[3], "2023-06-15");
        assert_eq!(cells[12], "ppm");
        assert_eq!(cells[13], "inhalation");
        assert_eq!(cells[16], "cancer");
        assert_eq!(cells[17], "3");
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_quotes_cells_containing_commas() {
        let mut tree = tree_with(vec![AnimalNode {
            model: animal(1),
            dose_groups: vec![DoseNode {
                group: dose_group(1, "ppm", None),
                outcomes: vec![outcome(1, "mortality", None, "2/10")],
            }],
        }]);
        tree.study.name = "Inhalation, chronic".to_string();

        let csv = to_csv(&flatten(&tree)).unwrap();
        assert!(csv.contains("\"Inhalation, chronic\""));
    }

    #[test]
    fn long_rows_carry_the_display_subset_with_labels() {
        let tree = tree_with(vec![AnimalNode {
            model: animal(1),
            dose_groups: vec![DoseNode {
                group: dose_group(1, "other", Some("mg/kg/day")),
                outcomes: vec![
                    outcome(1, "cancer", None, "3"),
                    outcome(2, "other", Some("behavioral change"), "observed"),
                ],
            }],
        }]);

        let rows = long_rows(&tree);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].animal_species, "Rat");
        assert_eq!(rows[0].animal_strain, "Wistar");
        assert_eq!(rows[0].animal_sex, "Male");
        assert_eq!(rows[0].dose_unit, "mg/kg/day");
        assert_eq!(rows[0].outcome_type, "Cancer Incidence");
        assert_eq!(rows[0].outcome_value, "3");
        // Resolved custom text has no label entry and passes through.
        assert_eq!(rows[1].outcome_type, "behavioral change");
    }
}
