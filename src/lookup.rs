use crate::types::SynonymPair;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Case-insensitive mapping from verbatim spellings to canonical terms.
///
/// Built once from approved synonym pairs and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationTable {
    entries: BTreeMap<String, String>,
}

impl NormalizationTable {
    /// Folds the synonym pairs into a table in two passes.
    ///
    /// The verbatim pass maps each spelling and its uppercase form to its
    /// canonical term, in input order. The canonical pass then maps every
    /// distinct canonical term and its uppercase form to itself. Colliding
    /// keys keep the last value written.
    pub fn build<'a>(pairs: impl IntoIterator<Item = &'a SynonymPair>) -> Self {
        let mut entries = BTreeMap::new();
        let mut canonical = BTreeSet::new();

        for pair in pairs {
            entries.insert(pair.verbatim.clone(), pair.normalised.clone());
            entries.insert(pair.verbatim.to_uppercase(), pair.normalised.clone());
            canonical.insert(pair.normalised.clone());
        }

        for term in canonical {
            entries.insert(term.to_uppercase(), term.clone());
            entries.insert(term.clone(), term);
        }

        Self { entries }
    }

    /// Resolves a raw value to its canonical form, trying the exact spelling
    /// before its uppercase form.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.entries
            .get(raw)
            .or_else(|| self.entries.get(&raw.to_uppercase()))
            .map(String::as_str)
    }

    pub fn is_canonical(&self, term: &str) -> bool {
        self.entries.get(term).is_some_and(|v| v == term)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pair_resolves_in_any_case() {
        let pairs = vec![SynonymPair::new("Foo", "Bar")];
        let table = NormalizationTable::build(&pairs);

        assert_eq!(table.resolve("Foo"), Some("Bar"));
        assert_eq!(table.resolve("FOO"), Some("Bar"));
        assert_eq!(table.resolve("foo"), Some("Bar"));
        assert_eq!(table.resolve("Bar"), Some("Bar"));
        assert_eq!(table.resolve("BAR"), Some("Bar"));
        assert_eq!(table.resolve("bAr"), Some("Bar"));
        assert_eq!(table.resolve("Baz"), None);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_canonical_terms() {
        let pairs = vec![
            SynonymPair::new("Sprague Dawley", "Sprague-Dawley"),
            SynonymPair::new("SD", "Sprague-Dawley"),
        ];
        let table = NormalizationTable::build(&pairs);

        assert!(table.is_canonical("Sprague-Dawley"));
        assert!(!table.is_canonical("SD"));
        assert!(!table.is_canonical("SPRAGUE-DAWLEY"));
        assert_eq!(table.resolve("sprague-dawley"), Some("Sprague-Dawley"));
    }

    #[test]
    fn test_uppercase_collision_last_write_wins() {
        let pairs = vec![
            SynonymPair::new("po", "oral"),
            SynonymPair::new("Po", "per os"),
        ];
        let table = NormalizationTable::build(&pairs);

        assert_eq!(table.resolve("po"), Some("oral"));
        assert_eq!(table.resolve("Po"), Some("per os"));
        assert_eq!(table.resolve("PO"), Some("per os"));
    }

    #[test]
    fn test_canonical_pass_overrides_verbatim_pass() {
        // "liver" is both a verbatim spelling of something else and,
        // uppercased, a canonical term; the canonical mapping wins
        let pairs = vec![
            SynonymPair::new("liver", "Hepar"),
            SynonymPair::new("hepatic", "Liver"),
        ];
        let table = NormalizationTable::build(&pairs);

        assert_eq!(table.resolve("liver"), Some("Hepar"));
        assert_eq!(table.resolve("LIVER"), Some("Liver"));
        assert_eq!(table.resolve("Liver"), Some("Liver"));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let pairs = vec![
            SynonymPair::new("male", "M"),
            SynonymPair::new("Males", "M"),
            SynonymPair::new("female", "F"),
        ];
        assert_eq!(NormalizationTable::build(&pairs), NormalizationTable::build(&pairs));
    }
}
