use crate::error::Result;
use crate::source::RecordSource;
use crate::types::{OntologyEdge, OntologyTerm, RawFinding, RawStudy, SynonymPair};
use async_trait::async_trait;

/// In-memory source for development and testing.
///
/// Rows are returned in insertion order after the same filtering the
/// database queries apply.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub studies: Vec<RawStudy>,
    pub findings: Vec<RawFinding>,
    pub terms: Vec<OntologyTerm>,
    pub edges: Vec<OntologyEdge>,
    /// (synonym domain, status, pair)
    pub synonyms: Vec<(String, String, SynonymPair)>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_synonym(&mut self, domain: &str, status: &str, verbatim: &str, normalised: &str) {
        self.synonyms.push((
            domain.to_string(),
            status.to_string(),
            SynonymPair::new(verbatim, normalised),
        ));
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn fetch_studies(&mut self) -> Result<Vec<RawStudy>> {
        Ok(self.studies.clone())
    }

    async fn fetch_findings(&mut self, sources: &[String]) -> Result<Vec<RawFinding>> {
        Ok(self
            .findings
            .iter()
            .filter(|f| sources.contains(&f.source))
            .cloned()
            .collect())
    }

    async fn fetch_ontology_terms(&mut self, domains: &[String]) -> Result<Vec<OntologyTerm>> {
        Ok(self
            .terms
            .iter()
            .filter(|t| domains.contains(&t.ontology))
            .cloned()
            .collect())
    }

    async fn fetch_ontology_edges(&mut self) -> Result<Vec<OntologyEdge>> {
        Ok(self.edges.clone())
    }

    async fn fetch_synonyms(&mut self, domains: &[String]) -> Result<Vec<SynonymPair>> {
        Ok(self
            .synonyms
            .iter()
            .filter(|(domain, status, _)| {
                status == crate::constants::APPROVED_SYNONYM_STATUS && domains.contains(domain)
            })
            .map(|(_, _, pair)| pair.clone())
            .collect())
    }
}
