//! Ontology closure tables.
//!
//! Terms and direct relations are extracted as-is; the closure is computed
//! here per domain and then joined back to human-readable term names.

pub mod closure;

use crate::normalize::capitalize;
use crate::types::{ClosureRow, OntologyEdge, OntologyTerm};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

pub use closure::transitive_closure;

/// How one closure dataset is derived from the term graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureSpec {
    /// Dataset name used in logs and the manifest
    pub dataset: String,
    /// Output file name, relative to the output directory
    pub file: String,
    pub domain: String,
    /// Pair every term with itself at distance 0
    #[serde(default)]
    pub include_self: bool,
    /// Capitalize term names in the output rows
    #[serde(default)]
    pub capitalize: bool,
    /// Umbrella ancestors whose rows are dropped (matched case-insensitively)
    #[serde(default)]
    pub exclude_ancestors: Vec<String>,
}

/// Why edges were left out of a domain's graph
#[derive(Debug, Default, PartialEq, Eq)]
struct EdgeScope {
    /// Edges with an endpoint that belongs to another domain
    out_of_domain: usize,
    /// Edges touching this domain whose other endpoint is no known term
    unknown_terms: usize,
}

fn scope_edges<'a>(
    terms: &[OntologyTerm],
    edges: &'a [OntologyEdge],
    names: &HashMap<&str, &str>,
) -> (Vec<(&'a str, &'a str)>, EdgeScope) {
    let known: HashSet<&str> = terms.iter().map(|t| t.term_id.as_str()).collect();
    let mut scope = EdgeScope::default();
    let mut scoped = Vec::new();

    for edge in edges {
        let (child, parent) = (edge.child_id.as_str(), edge.parent_id.as_str());
        match (names.contains_key(child), names.contains_key(parent)) {
            (true, true) => scoped.push((child, parent)),
            (true, false) if !known.contains(parent) => {
                debug!(child, parent, "Relation to unknown parent term");
                scope.unknown_terms += 1;
            }
            (false, true) if !known.contains(child) => {
                debug!(child, parent, "Relation from unknown child term");
                scope.unknown_terms += 1;
            }
            _ => scope.out_of_domain += 1,
        }
    }

    (scoped, scope)
}

/// Builds the named closure rows of one domain.
///
/// Only edges whose two endpoints are terms of `spec.domain` take part, so no
/// row ever pairs terms from different domains. Edges naming an unknown term
/// id are skipped with a warning.
pub fn build_domain_closure(
    terms: &[OntologyTerm],
    edges: &[OntologyEdge],
    spec: &ClosureSpec,
) -> Vec<ClosureRow> {
    let names: HashMap<&str, &str> = terms
        .iter()
        .filter(|t| t.ontology == spec.domain)
        .map(|t| (t.term_id.as_str(), t.term_name.as_str()))
        .collect();

    let (scoped, scope) = scope_edges(terms, edges, &names);
    debug!(
        domain = %spec.domain,
        in_domain = scoped.len(),
        out_of_domain = scope.out_of_domain,
        "Scoped ontology edges"
    );
    if scope.unknown_terms > 0 {
        warn!(
            domain = %spec.domain,
            edges = scope.unknown_terms,
            "Skipping relations that reference unknown term ids"
        );
    }

    let excluded: BTreeSet<String> = spec
        .exclude_ancestors
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    let mut rows = BTreeSet::new();
    for (child_id, parent_id) in transitive_closure(scoped, spec.include_self) {
        let (child, parent) = (names[child_id], names[parent_id]);
        if excluded.contains(&parent.to_lowercase()) {
            continue;
        }
        let (child_term, parent_term) = if spec.capitalize {
            (capitalize(child), capitalize(parent))
        } else {
            (child.to_string(), parent.to_string())
        };
        rows.insert(ClosureRow {
            child_term,
            parent_term,
            ontology: spec.domain.clone(),
        });
    }

    rows.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: &str, name: &str, ontology: &str) -> OntologyTerm {
        OntologyTerm {
            term_id: id.to_string(),
            term_name: name.to_string(),
            ontology: ontology.to_string(),
        }
    }

    fn edge(child: &str, parent: &str) -> OntologyEdge {
        OntologyEdge {
            child_id: child.to_string(),
            parent_id: parent.to_string(),
        }
    }

    fn spec(domain: &str) -> ClosureSpec {
        ClosureSpec {
            dataset: format!("{domain}_ontology"),
            file: format!("{domain}_ontology.bin"),
            domain: domain.to_string(),
            include_self: false,
            capitalize: false,
            exclude_ancestors: Vec::new(),
        }
    }

    fn pairs(rows: &[ClosureRow]) -> Vec<(&str, &str)> {
        rows.iter()
            .map(|r| (r.child_term.as_str(), r.parent_term.as_str()))
            .collect()
    }

    fn fixture() -> (Vec<OntologyTerm>, Vec<OntologyEdge>) {
        let terms = vec![
            term("1", "hepatocyte", "anatomy"),
            term("2", "liver", "anatomy"),
            term("3", "digestive system", "anatomy"),
            term("10", "necrosis", "histopathology"),
            term("11", "cell death", "histopathology"),
            term("12", "morphologic change", "histopathology"),
        ];
        let edges = vec![
            edge("1", "2"),
            edge("2", "3"),
            edge("10", "11"),
            edge("11", "12"),
            // crosses domains and must not leak into either closure
            edge("10", "2"),
        ];
        (terms, edges)
    }

    #[test]
    fn test_anatomy_chain() {
        let (terms, edges) = fixture();
        let rows = build_domain_closure(&terms, &edges, &spec("anatomy"));

        assert_eq!(
            pairs(&rows),
            vec![
                ("hepatocyte", "digestive system"),
                ("hepatocyte", "liver"),
                ("liver", "digestive system"),
            ]
        );
        assert!(rows.iter().all(|r| r.ontology == "anatomy"));
    }

    #[test]
    fn test_no_cross_domain_rows() {
        let (terms, edges) = fixture();
        let rows = build_domain_closure(&terms, &edges, &spec("histopathology"));
        assert!(rows.iter().all(|r| r.parent_term != "liver"));
        assert!(rows.iter().all(|r| r.ontology == "histopathology"));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_self_closure_and_root_exclusion() {
        let (terms, edges) = fixture();
        let mut histo = spec("histopathology");
        histo.include_self = true;
        histo.exclude_ancestors = vec!["Morphologic Change".to_string()];

        let rows = build_domain_closure(&terms, &edges, &histo);

        assert!(rows.iter().all(|r| r.parent_term != "morphologic change"));
        assert_eq!(
            pairs(&rows),
            vec![
                ("cell death", "cell death"),
                ("necrosis", "cell death"),
                ("necrosis", "necrosis"),
            ]
        );
    }

    #[test]
    fn test_capitalized_names_are_deduplicated() {
        let terms = vec![
            term("1", "LIVER lobe", "anatomy"),
            term("2", "liver lobe", "anatomy"),
            term("3", "Liver", "anatomy"),
        ];
        let edges = vec![edge("1", "3"), edge("2", "3")];
        let mut anatomy = spec("anatomy");
        anatomy.capitalize = true;

        let rows = build_domain_closure(&terms, &edges, &anatomy);
        assert_eq!(pairs(&rows), vec![("Liver lobe", "Liver")]);
    }

    #[test]
    fn test_unknown_term_ids_skipped() {
        let terms = vec![term("1", "liver", "anatomy")];
        let edges = vec![edge("1", "99")];
        assert!(build_domain_closure(&terms, &edges, &spec("anatomy")).is_empty());
    }

    #[test]
    fn test_scope_counts_unknown_and_foreign_edges() {
        let (terms, mut edges) = fixture();
        edges.push(edge("1", "99"));
        edges.push(edge("98", "2"));

        let names: HashMap<&str, &str> = terms
            .iter()
            .filter(|t| t.ontology == "anatomy")
            .map(|t| (t.term_id.as_str(), t.term_name.as_str()))
            .collect();
        let (scoped, scope) = scope_edges(&terms, &edges, &names);

        assert_eq!(scoped, vec![("1", "2"), ("2", "3")]);
        assert_eq!(
            scope,
            EdgeScope {
                out_of_domain: 3,
                unknown_terms: 2,
            }
        );
    }
}
