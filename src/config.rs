use crate::constants::*;
use crate::error::{ExtractError, Result};
use crate::normalize::{check_columns, Transforms, FINDING_TEXT_COLUMNS, STUDY_TEXT_COLUMNS};
use crate::ontology::ClosureSpec;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Run configuration, read from `extract.toml` when present.
///
/// Every field has a default matching the reference extraction, so an empty
/// or missing file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub studies: StudiesConfig,
    pub findings: FindingsConfig,
    pub closures: Vec<ClosureSpec>,
    pub normalisation: NormalisationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StudiesConfig {
    pub file: String,
    pub transforms: Transforms,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FindingsConfig {
    pub file: String,
    /// Source categories to extract
    pub sources: Vec<String>,
    pub transforms: Transforms,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalisationConfig {
    pub file: String,
    pub synonym_domains: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            output: OutputConfig::default(),
            studies: StudiesConfig::default(),
            findings: FindingsConfig::default(),
            closures: default_closures(),
            normalisation: NormalisationConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            dbname: DEFAULT_DB_NAME.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Default for StudiesConfig {
    fn default() -> Self {
        Self {
            file: STUDY_FILE.to_string(),
            transforms: Transforms::new(),
        }
    }
}

impl Default for FindingsConfig {
    fn default() -> Self {
        Self {
            file: FINDINGS_FILE.to_string(),
            sources: default_finding_sources(),
            transforms: Transforms::new(),
        }
    }
}

impl Default for NormalisationConfig {
    fn default() -> Self {
        Self {
            file: NORMALISATION_FILE.to_string(),
            synonym_domains: default_synonym_domains(),
        }
    }
}

/// Anatomy closure with self-pairs, and histopathology closure with
/// self-pairs minus the umbrella root.
pub fn default_closures() -> Vec<ClosureSpec> {
    vec![
        ClosureSpec {
            dataset: ANATOMY_DATASET.to_string(),
            file: ANATOMY_FILE.to_string(),
            domain: ANATOMY_DOMAIN.to_string(),
            include_self: true,
            capitalize: false,
            exclude_ancestors: Vec::new(),
        },
        ClosureSpec {
            dataset: MORPH_CHANGES_DATASET.to_string(),
            file: MORPH_CHANGES_FILE.to_string(),
            domain: HISTOPATHOLOGY_DOMAIN.to_string(),
            include_self: true,
            capitalize: false,
            exclude_ancestors: vec![MORPHOLOGIC_CHANGE_ROOT.to_string()],
        },
    ]
}

impl ExtractConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, `extract.toml` in the
    /// working directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: ExtractConfig = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Applies `ETOX_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("ETOX_DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("ETOX_DB_PORT") {
            self.database.port = port.parse().map_err(|_| {
                ExtractError::Config(format!("ETOX_DB_PORT is not a valid port: '{port}'"))
            })?;
        }
        if let Some(dbname) = lookup("ETOX_DB_NAME") {
            self.database.dbname = dbname;
        }
        if let Some(dir) = lookup("ETOX_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Rejects configurations that would silently produce wrong output:
    /// transforms on unknown columns, unnamed closures, and two datasets
    /// sharing a name or a file.
    pub fn validate(&self) -> Result<()> {
        check_columns(STUDY_DATASET, &self.studies.transforms, &STUDY_TEXT_COLUMNS)?;
        check_columns(FINDINGS_DATASET, &self.findings.transforms, &FINDING_TEXT_COLUMNS)?;

        if self.findings.sources.is_empty() {
            return Err(ExtractError::Config(
                "findings.sources must name at least one source category".to_string(),
            ));
        }

        let mut datasets = BTreeSet::from([STUDY_DATASET, FINDINGS_DATASET, NORMALISATION_DATASET]);
        let mut files = BTreeSet::from([
            self.studies.file.as_str(),
            self.findings.file.as_str(),
            self.normalisation.file.as_str(),
            MANIFEST_FILE,
        ]);
        if files.len() != 4 {
            return Err(ExtractError::Config(
                "study, findings, normalisation and manifest files must be distinct".to_string(),
            ));
        }

        for closure in &self.closures {
            if closure.domain.trim().is_empty() {
                return Err(ExtractError::Config(format!(
                    "closure '{}' has no ontology domain",
                    closure.dataset
                )));
            }
            if !datasets.insert(closure.dataset.as_str()) {
                return Err(ExtractError::Config(format!(
                    "duplicate dataset name '{}'",
                    closure.dataset
                )));
            }
            if !files.insert(closure.file.as_str()) {
                return Err(ExtractError::Config(format!(
                    "closure '{}' reuses output file '{}'",
                    closure.dataset, closure.file
                )));
            }
        }

        Ok(())
    }

    /// Distinct ontology domains named by the configured closures
    pub fn ontology_domains(&self) -> Vec<String> {
        self.closures
            .iter()
            .map(|c| c.domain.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ColumnTransform;

    #[test]
    fn test_defaults_match_reference_extraction() {
        let config = ExtractConfig::default();
        config.validate().unwrap();

        assert_eq!(config.database.dbname, "vitic2016_1");
        assert_eq!(config.closures.len(), 2);
        assert!(config.closures.iter().all(|c| c.include_self));
        assert_eq!(config.closures[1].exclude_ancestors, vec!["morphologic change"]);
        assert_eq!(config.normalisation.synonym_domains.len(), 6);
        assert_eq!(config.ontology_domains(), vec!["anatomy", "histopathology"]);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: ExtractConfig = toml::from_str(
            r#"
            [database]
            host = "db.internal"

            [findings]
            sources = ["HistopathologicalFinding"]

            [findings.transforms]
            organ = "capitalize"
            sex = "uppercase"

            [[closures]]
            dataset = "anatomy_strict"
            file = "anatomy_strict.bin"
            domain = "anatomy"
            capitalize = true
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.findings.file, "findings.bin.gz");
        assert_eq!(
            config.findings.transforms.get("organ"),
            Some(&ColumnTransform::Capitalize)
        );
        assert_eq!(config.closures.len(), 1);
        assert!(!config.closures[0].include_self);
        assert!(config.closures[0].capitalize);
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: ExtractConfig =
            toml::from_str(include_str!("../config/extract.example.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.closures.len(), 2);
        assert!(config.closures.iter().all(|c| c.capitalize));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ExtractConfig::default();
        config
            .apply_overrides(|key| match key {
                "ETOX_DB_PORT" => Some("6543".to_string()),
                "ETOX_OUTPUT_DIR" => Some("/tmp/etox".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/etox"));
        assert_eq!(config.database.host, DEFAULT_DB_HOST);

        let bad = config.apply_overrides(|key| (key == "ETOX_DB_PORT").then(|| "x".to_string()));
        assert!(bad.is_err());
    }

    #[test]
    fn test_duplicate_closure_file_rejected() {
        let mut config = ExtractConfig::default();
        config.closures[1].file = config.closures[0].file.clone();
        assert!(config.validate().is_err());

        let mut config = ExtractConfig::default();
        config.closures[0].dataset = STUDY_DATASET.to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = ExtractConfig::load(Some(Path::new("/nonexistent/extract.toml")));
        assert!(matches!(result, Err(ExtractError::Config(_))));
    }
}
