use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to connect to database at {host}: {source}")]
    Connection {
        host: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Query for {dataset} failed: {source}")]
    Query {
        dataset: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unrecognized data file format: {0}")]
    Format(String),
}

impl ExtractError {
    pub fn query(dataset: &str, source: sqlx::Error) -> Self {
        ExtractError::Query {
            dataset: dataset.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
