//! Where extracted rows come from.

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::types::{OntologyEdge, OntologyTerm, RawFinding, RawStudy, SynonymPair};
use async_trait::async_trait;

pub use memory::InMemorySource;
pub use postgres::{PostgresSource, SourceCredentials};

/// Read side of the extraction.
///
/// Every method runs one query to completion. Implementations return rows in
/// a stable order so that repeated runs over unchanged data produce identical
/// output.
#[async_trait]
pub trait RecordSource: Send {
    async fn fetch_studies(&mut self) -> Result<Vec<RawStudy>>;

    /// Findings whose source category is one of `sources`
    async fn fetch_findings(&mut self, sources: &[String]) -> Result<Vec<RawFinding>>;

    /// Terms belonging to any of `domains`
    async fn fetch_ontology_terms(&mut self, domains: &[String]) -> Result<Vec<OntologyTerm>>;

    /// All direct child -> parent relations, across every domain
    async fn fetch_ontology_edges(&mut self) -> Result<Vec<OntologyEdge>>;

    /// Approved synonyms within the given synonym domains
    async fn fetch_synonyms(&mut self, domains: &[String]) -> Result<Vec<SynonymPair>>;
}
