use serde::{Deserialize, Serialize};

/// Study row as returned by the source, before normalization
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RawStudy {
    pub study_id: String,
    pub subst_id: Option<String>,
    pub sex: Option<String>,
    pub administration_route: Option<String>,
    pub species: Option<String>,
    pub strain: Option<String>,
    pub exposure_period_days: Option<i32>,
    pub report_number: Option<String>,
}

/// Finding row as returned by the source, before normalization
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RawFinding {
    pub study_id: String,
    pub relevance: Option<String>,
    pub observation: Option<String>,
    pub organ: Option<String>,
    pub sex: Option<String>,
    pub dose: Option<f64>,
    pub grade: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub study_id: String,
    pub subst_id: Option<String>,
    pub sex: Option<String>,
    pub administration_route: Option<String>,
    pub species: Option<String>,
    pub strain: Option<String>,
    pub exposure_period_days: Option<i32>,
    pub report_number: Option<String>,
}

/// A normalized finding. Relevance, observation and organ are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub study_id: String,
    pub relevance: String,
    pub observation: String,
    pub organ: String,
    pub sex: Option<String>,
    pub dose: Option<f64>,
    pub grade: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct OntologyTerm {
    pub term_id: String,
    pub term_name: String,
    pub ontology: String,
}

/// One direct relation: `child_id` is-a / part-of `parent_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct OntologyEdge {
    pub child_id: String,
    pub parent_id: String,
}

/// Approved synonym pair feeding the normalization table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SynonymPair {
    pub verbatim: String,
    pub normalised: String,
}

impl SynonymPair {
    pub fn new(verbatim: impl Into<String>, normalised: impl Into<String>) -> Self {
        Self {
            verbatim: verbatim.into(),
            normalised: normalised.into(),
        }
    }
}

/// Descendant/ancestor pair within one ontology domain
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClosureRow {
    pub child_term: String,
    pub parent_term: String,
    pub ontology: String,
}
