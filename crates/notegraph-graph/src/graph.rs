//! Immutable link graph over a set of documents

use notegraph_core::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Link graph built once from a document set.
///
/// All maps are keyed by the normalized note key. `forward` keeps every
/// target regardless of existence; targets with no document land in
/// `broken`. Nothing is mutated after [`GraphIndex::build`].
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    /// Documents in insertion order
    documents: Vec<Document>,

    /// Key to slot in `documents`
    positions: HashMap<String, usize>,

    /// Fuzzy key per document slot
    pub(crate) fuzzy_keys: Vec<String>,

    /// Source key to deduplicated target keys
    forward: HashMap<String, BTreeSet<String>>,

    /// Target key to source keys, derived from `forward`
    backward: HashMap<String, BTreeSet<String>>,

    /// Target key with no document to source keys
    broken: BTreeMap<String, BTreeSet<String>>,

    /// Target key to the first spelling seen in a link
    target_names: HashMap<String, String>,

    edge_count: usize,
}

impl GraphIndex {
    /// Build the index from parsed documents.
    ///
    /// Never fails. When two documents share a key the later one replaces
    /// the earlier in its original slot.
    #[tracing::instrument(skip_all, fields(input = documents.len()))]
    pub fn build(documents: Vec<Document>) -> Self {
        let mut index = Self::default();

        for doc in documents {
            let key = doc.key();
            if key.is_empty() {
                log::warn!("Skipping document with empty name: {}", doc.path);
                continue;
            }

            if let Some(&slot) = index.positions.get(&key) {
                log::warn!(
                    "Duplicate note key '{}': {} replaces {}",
                    key,
                    doc.path,
                    index.documents[slot].path
                );
                index.documents[slot] = doc;
            } else {
                index.positions.insert(key, index.documents.len());
                index.documents.push(doc);
            }
        }

        index.fuzzy_keys = index
            .documents
            .iter()
            .map(|doc| crate::resolver::fuzzy_key(&doc.name))
            .collect();

        // Edges come from the surviving documents only
        for doc in &index.documents {
            let source = doc.key();
            let mut targets = BTreeSet::new();

            for link in &doc.links {
                let target = link.target_key();
                if target.is_empty() {
                    continue;
                }
                index
                    .target_names
                    .entry(target.clone())
                    .or_insert_with(|| link.target.trim().to_string());
                targets.insert(target);
            }

            for target in &targets {
                index
                    .backward
                    .entry(target.clone())
                    .or_default()
                    .insert(source.clone());
                if !index.positions.contains_key(target) {
                    index
                        .broken
                        .entry(target.clone())
                        .or_default()
                        .insert(source.clone());
                }
            }

            index.edge_count += targets.len();
            if !targets.is_empty() {
                index.forward.insert(source, targets);
            }
        }

        log::info!(
            "Built graph index: {} documents, {} edges, {} broken targets",
            index.documents.len(),
            index.edge_count,
            index.broken.len()
        );

        index
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document stored under a normalized key
    pub fn document(&self, key: &str) -> Option<&Document> {
        self.positions.get(key).map(|&slot| &self.documents[slot])
    }

    /// True when a document exists for the key
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// All documents in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub(crate) fn slot(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Deduplicated target keys of a source, existing or not
    pub fn forward(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.forward.get(key)
    }

    /// Keys of documents linking to a target
    pub fn backward(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.backward.get(key)
    }

    /// Broken target keys with the sources that reference them
    pub fn broken(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.broken
    }

    /// Display spelling of a link target (first seen), falling back to the key
    pub fn target_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.target_names.get(key).map_or(key, String::as_str)
    }

    /// Number of distinct (source, target) edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of raw link occurrences from `source` to `target`
    pub fn reference_count(&self, source: &str, target: &str) -> usize {
        self.document(source)
            .map_or(0, |doc| doc.reference_count(target))
    }

    /// Summary counts
    pub fn stats(&self) -> GraphStats {
        let orphaned = self
            .documents
            .iter()
            .filter(|doc| self.backward(&doc.key()).is_none_or(BTreeSet::is_empty))
            .count();

        GraphStats {
            total_documents: self.documents.len(),
            total_edges: self.edge_count,
            broken_targets: self.broken.len(),
            orphaned_documents: orphaned,
        }
    }
}

impl FromIterator<Document> for GraphIndex {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect())
    }
}

/// Statistics about the graph
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub total_documents: usize,
    pub total_edges: usize,
    pub broken_targets: usize,
    pub orphaned_documents: usize,
}
