//! Dataset and vocabulary constants shared across the extractor

/// Value substituted for missing relevance, organ and observation terms
pub const MISSING_SENTINEL: &str = "NA";

pub const DEFAULT_DB_HOST: &str = "172.20.16.76";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "vitic2016_1";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_CONFIG_FILE: &str = "extract.toml";

// Dataset names, also used as manifest keys
pub const STUDY_DATASET: &str = "study";
pub const FINDINGS_DATASET: &str = "findings";
pub const ANATOMY_DATASET: &str = "anatomy_ontology";
pub const MORPH_CHANGES_DATASET: &str = "morph_changes_ontology";
pub const NORMALISATION_DATASET: &str = "normalisation";

pub const STUDY_FILE: &str = "study.bin";
pub const FINDINGS_FILE: &str = "findings.bin.gz";
pub const ANATOMY_FILE: &str = "anatomy_ontology.bin";
pub const MORPH_CHANGES_FILE: &str = "morph_changes_ontology.bin";
pub const NORMALISATION_FILE: &str = "normalisation.bin";
pub const MANIFEST_FILE: &str = "manifest.json";

// Ontology domains
pub const ANATOMY_DOMAIN: &str = "anatomy";
pub const HISTOPATHOLOGY_DOMAIN: &str = "histopathology";

/// Umbrella histopathology root that every morphological change descends from
pub const MORPHOLOGIC_CHANGE_ROOT: &str = "morphologic change";

pub const TREATMENT_RELATED_RAW: &str = "Treatment related";
pub const TREATMENT_RELATED: &str = "treatment related";

// Finding source categories
pub const HISTOPATHOLOGICAL_SOURCE: &str = "HistopathologicalFinding";
pub const CLINICAL_SIGN_SOURCE: &str = "ClinicalSign";
pub const GROSS_NECROPSY_SOURCE: &str = "GrossNecropsyFinding";

pub const APPROVED_SYNONYM_STATUS: &str = "APPROVED";

/// Synonym domains whose approved spellings feed the normalization table
pub const SYNONYM_DOMAINS: [&str; 6] = [
    "strain",
    "sex",
    "administration route",
    "species",
    "organ tissue",
    "microscopic finding",
];

pub fn default_finding_sources() -> Vec<String> {
    vec![
        HISTOPATHOLOGICAL_SOURCE.to_string(),
        CLINICAL_SIGN_SOURCE.to_string(),
        GROSS_NECROPSY_SOURCE.to_string(),
    ]
}

pub fn default_synonym_domains() -> Vec<String> {
    SYNONYM_DOMAINS.iter().map(|d| d.to_string()).collect()
}
