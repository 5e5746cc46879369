//! Column-level reshaping of extracted study and finding rows.
//!
//! Source variants disagree on which columns are capitalized, so every
//! transform is configured per column rather than hard-coded.

use crate::constants::{MISSING_SENTINEL, TREATMENT_RELATED, TREATMENT_RELATED_RAW};
use crate::error::{ExtractError, Result};
use crate::types::{Finding, RawFinding, RawStudy, Study};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STUDY_TEXT_COLUMNS: [&str; 6] = [
    "subst_id",
    "sex",
    "administration_route",
    "species",
    "strain",
    "report_number",
];

pub const FINDING_TEXT_COLUMNS: [&str; 5] = ["relevance", "observation", "organ", "sex", "grade"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnTransform {
    /// First character uppercase, the rest lowercase
    Capitalize,
    Uppercase,
    Lowercase,
}

impl ColumnTransform {
    pub fn apply(self, value: &str) -> String {
        match self {
            ColumnTransform::Capitalize => capitalize(value),
            ColumnTransform::Uppercase => value.to_uppercase(),
            ColumnTransform::Lowercase => value.to_lowercase(),
        }
    }
}

/// Column name -> transform
pub type Transforms = BTreeMap<String, ColumnTransform>;

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Rejects transforms naming a column the table does not have.
pub fn check_columns(table: &str, transforms: &Transforms, known: &[&str]) -> Result<()> {
    for column in transforms.keys() {
        if !known.contains(&column.as_str()) {
            return Err(ExtractError::Config(format!(
                "{table}: cannot transform unknown column '{column}' (expected one of {})",
                known.join(", ")
            )));
        }
    }
    Ok(())
}

fn transform_opt(transforms: &Transforms, column: &str, value: Option<String>) -> Option<String> {
    value.map(|v| transform(transforms, column, v))
}

fn transform(transforms: &Transforms, column: &str, value: String) -> String {
    match transforms.get(column) {
        Some(t) => t.apply(&value),
        None => value,
    }
}

pub fn normalize_studies(raw: Vec<RawStudy>, transforms: &Transforms) -> Vec<Study> {
    raw.into_iter()
        .map(|r| Study {
            study_id: r.study_id,
            subst_id: transform_opt(transforms, "subst_id", r.subst_id),
            sex: transform_opt(transforms, "sex", r.sex),
            administration_route: transform_opt(
                transforms,
                "administration_route",
                r.administration_route,
            ),
            species: transform_opt(transforms, "species", r.species),
            strain: transform_opt(transforms, "strain", r.strain),
            exposure_period_days: r.exposure_period_days,
            report_number: transform_opt(transforms, "report_number", r.report_number),
        })
        .collect()
}

fn fill(value: Option<String>) -> String {
    match value {
        Some(v) => v,
        None => MISSING_SENTINEL.to_string(),
    }
}

fn fold_relevance(value: Option<String>) -> String {
    match value {
        Some(v) if v == TREATMENT_RELATED_RAW => TREATMENT_RELATED.to_string(),
        other => fill(other),
    }
}

/// Fills missing relevance/observation/organ with the sentinel, folds the
/// relevance label, then applies the configured transforms. The sentinel
/// itself is never transformed.
pub fn normalize_findings(raw: Vec<RawFinding>, transforms: &Transforms) -> Vec<Finding> {
    let filled = |column: &str, value: String| {
        if value == MISSING_SENTINEL {
            value
        } else {
            transform(transforms, column, value)
        }
    };

    raw.into_iter()
        .map(|r| Finding {
            study_id: r.study_id,
            relevance: filled("relevance", fold_relevance(r.relevance)),
            observation: filled("observation", fill(r.observation)),
            organ: filled("organ", fill(r.organ)),
            sex: transform_opt(transforms, "sex", r.sex),
            dose: r.dose,
            grade: transform_opt(transforms, "grade", r.grade),
            source: r.source,
        })
        .collect()
}
