//! Name resolution: exact key lookup with a fuzzy fallback

use crate::GraphIndex;
use notegraph_core::{Document, normalize_key};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// How a name was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// A resolved document
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub document: &'a Document,
    pub match_kind: MatchKind,
}

/// Reduce a name for tolerant matching.
///
/// Lowercased and trimmed, `-` and `_` removed, then decomposed (NFD) with
/// every non-ASCII char dropped, so `Café-Notes` and `cafe_notes` agree.
pub fn fuzzy_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .nfd()
        .filter(char::is_ascii)
        .collect()
}

impl GraphIndex {
    /// Resolve a user-supplied name to a document.
    ///
    /// Exact key match first. On a miss, the first document in insertion
    /// order with the same fuzzy key wins. A name whose fuzzy key is empty
    /// only ever matches exactly.
    pub fn resolve(&self, name: &str) -> Option<Resolved<'_>> {
        let key = normalize_key(name);
        if let Some(document) = self.document(&key) {
            return Some(Resolved {
                document,
                match_kind: MatchKind::Exact,
            });
        }

        let wanted = fuzzy_key(name);
        if wanted.is_empty() {
            return None;
        }

        let slot = self.fuzzy_keys.iter().position(|candidate| *candidate == wanted)?;
        log::debug!("Fuzzy match for '{}': {}", name, self.documents()[slot].name);
        Some(Resolved {
            document: &self.documents()[slot],
            match_kind: MatchKind::Fuzzy,
        })
    }

    /// Resolve to the document only
    pub fn resolve_document(&self, name: &str) -> Option<&Document> {
        self.resolve(name).map(|resolved| resolved.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> GraphIndex {
        GraphIndex::build(
            names
                .iter()
                .map(|name| Document::new(*name, format!("{}.md", name)))
                .collect(),
        )
    }

    #[test]
    fn test_fuzzy_key() {
        assert_eq!(fuzzy_key("Note-With_Dashes"), "notewithdashes");
        assert_eq!(fuzzy_key("  Café  "), "cafe");
        assert_eq!(fuzzy_key("日本語"), "");
        assert_eq!(fuzzy_key("a b"), "a b");
    }

    #[test]
    fn test_exact_case_insensitive() {
        let index = index(&["Project Alpha"]);
        let first = index.resolve("project alpha").unwrap();
        let second = index.resolve("  PROJECT ALPHA ").unwrap();
        assert_eq!(first.match_kind, MatchKind::Exact);
        assert_eq!(first.document.name, second.document.name);
    }

    #[test]
    fn test_fuzzy_dash_underscore_equivalence() {
        let index = index(&["Note_With_Dashes"]);
        let resolved = index.resolve("Note-With-Dashes").unwrap();
        assert_eq!(resolved.match_kind, MatchKind::Fuzzy);
        assert_eq!(resolved.document.name, "Note_With_Dashes");
        assert!(index.resolve("notewithdashes").is_some());
    }

    #[test]
    fn test_fuzzy_diacritics() {
        let index = index(&["Résumé"]);
        let resolved = index.resolve("resume").unwrap();
        assert_eq!(resolved.match_kind, MatchKind::Fuzzy);
    }

    #[test]
    fn test_fuzzy_first_in_insertion_order() {
        let index = index(&["my-note", "my_note"]);
        let resolved = index.resolve("MyNote").unwrap();
        assert_eq!(resolved.document.name, "my-note");
    }

    #[test]
    fn test_empty_fuzzy_key_never_matches() {
        let index = index(&["日本", "---"]);
        assert!(index.resolve("中文").is_none());
        assert!(index.resolve("__").is_none());
        // exact still works
        assert_eq!(index.resolve("---").unwrap().match_kind, MatchKind::Exact);
    }

    #[test]
    fn test_unknown_name() {
        let index = index(&["Alpha"]);
        assert!(index.resolve("Beta").is_none());
        assert!(index.resolve_document("alpha").is_some());
    }
}
