//! Extraction of eTOX repeat-dose toxicity data into local data files

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod normalize;
pub mod ontology;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod types;

pub use error::{ExtractError, Result};
pub use lookup::NormalizationTable;
