//! Multi-root breadth-first traversal over forward links

use crate::GraphIndex;
use notegraph_core::{Error, LinkKind, Result, path_in_folder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Parameters of a traversal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalRequest {
    /// Names to start from, resolved like any user-supplied name
    pub roots: Vec<String>,
    /// Deepest level reported; nodes at this depth are not expanded
    pub max_depth: usize,
    /// Folders whose notes are treated as absent (roots excepted)
    #[serde(default)]
    pub exclude_folders: Vec<String>,
}

impl TraversalRequest {
    pub fn new<I, S>(roots: I, max_depth: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            max_depth,
            exclude_folders: Vec::new(),
        }
    }

    pub fn exclude_folder(mut self, folder: impl Into<String>) -> Self {
        self.exclude_folders.push(folder.into());
        self
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude_folders
            .iter()
            .any(|folder| path_in_folder(path, folder))
    }
}

/// A note reached by the traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalNode {
    pub name: String,
    pub path: String,
    pub depth: usize,
    /// Kind of the link that first reached this note; `None` for roots
    pub link_type: Option<LinkKind>,
    pub tags: Vec<String>,
}

/// A link to a note that does not exist
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MissingLink {
    pub target: String,
    pub source: String,
}

/// Result of a traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traversal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<Vec<String>>,
    pub max_depth: usize,
    /// Sorted by depth, then name
    pub notes: Vec<TraversalNode>,
    /// Sorted by target, then source
    pub missing: Vec<MissingLink>,
}

impl Traversal {
    /// Resolved root names in request order
    pub fn root_names(&self) -> Vec<&str> {
        match (&self.root, &self.roots) {
            (Some(root), _) => vec![root.as_str()],
            (None, Some(roots)) => roots.iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        }
    }
}

impl GraphIndex {
    /// Walk forward links from every root with a shared visited set.
    ///
    /// Fails with [`Error::UnresolvedRoot`] when any root does not resolve.
    /// Edges are followed in the source's link order so the first link to
    /// reach a note decides its `link_type`.
    #[tracing::instrument(skip(self), fields(roots = request.roots.len()))]
    pub fn traverse(&self, request: &TraversalRequest) -> Result<Traversal> {
        if request.roots.is_empty() {
            return Err(Error::invalid_argument("at least one root is required"));
        }

        let mut root_slots = Vec::with_capacity(request.roots.len());
        for name in &request.roots {
            let resolved = self
                .resolve(name)
                .ok_or_else(|| Error::unresolved_root(name.as_str()))?;
            let slot = self
                .slot(&resolved.document.key())
                .ok_or_else(|| Error::unresolved_root(name.as_str()))?;
            root_slots.push(slot);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut notes = Vec::new();
        let mut missing = BTreeSet::new();

        for &slot in &root_slots {
            if visited.insert(slot) {
                notes.push(self.node(slot, 0, None));
                queue.push_back((slot, 0));
            }
        }

        while let Some((slot, depth)) = queue.pop_front() {
            if depth >= request.max_depth {
                continue;
            }

            let source = &self.documents()[slot];
            for link in &source.links {
                let key = link.target_key();
                if key.is_empty() {
                    continue;
                }

                let Some(target) = self.slot(&key) else {
                    missing.insert(MissingLink {
                        target: self.target_name(&key).to_string(),
                        source: source.name.clone(),
                    });
                    continue;
                };

                if request.is_excluded(&self.documents()[target].path) {
                    continue;
                }
                if visited.insert(target) {
                    notes.push(self.node(target, depth + 1, Some(link.kind)));
                    queue.push_back((target, depth + 1));
                }
            }
        }

        notes.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.name.cmp(&b.name)));

        let mut root_names: Vec<String> = Vec::with_capacity(root_slots.len());
        for &slot in &root_slots {
            let name = &self.documents()[slot].name;
            if !root_names.contains(name) {
                root_names.push(name.clone());
            }
        }

        let (root, roots) = if request.roots.len() == 1 {
            (root_names.pop(), None)
        } else {
            (None, Some(root_names))
        };

        log::debug!(
            "Traversal reached {} notes, {} missing links",
            notes.len(),
            missing.len()
        );

        Ok(Traversal {
            root,
            roots,
            max_depth: request.max_depth,
            notes,
            missing: missing.into_iter().collect(),
        })
    }

    fn node(&self, slot: usize, depth: usize, link_type: Option<LinkKind>) -> TraversalNode {
        let doc = &self.documents()[slot];
        TraversalNode {
            name: doc.name.clone(),
            path: doc.path.clone(),
            depth,
            link_type,
            tags: doc.effective_tags(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notegraph_core::{Document, LinkRef};

    fn note(path: &str, links: &[&str]) -> Document {
        let name = path.rsplit('/').next().unwrap_or(path).trim_end_matches(".md");
        links.iter().enumerate().fold(
            Document::new(name, path),
            |doc, (i, target)| doc.with_link(LinkRef::wikilink(*target, i + 1)),
        )
    }

    fn chain() -> GraphIndex {
        GraphIndex::build(vec![
            note("A.md", &["B"]),
            note("B.md", &["C"]),
            note("C.md", &["D"]),
            note("D.md", &[]),
        ])
    }

    fn names(traversal: &Traversal) -> Vec<(&str, usize)> {
        traversal
            .notes
            .iter()
            .map(|n| (n.name.as_str(), n.depth))
            .collect()
    }

    #[test]
    fn test_depth_bound() {
        let index = chain();
        let result = index.traverse(&TraversalRequest::new(["A"], 2)).unwrap();
        assert_eq!(names(&result), vec![("A", 0), ("B", 1), ("C", 2)]);
        assert!(result.notes.iter().all(|n| n.depth <= 2));

        let zero = index.traverse(&TraversalRequest::new(["A"], 0)).unwrap();
        assert_eq!(names(&zero), vec![("A", 0)]);
    }

    #[test]
    fn test_unresolved_root_aborts() {
        let index = chain();
        let err = index
            .traverse(&TraversalRequest::new(["A", "Nowhere"], 3))
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedRoot { ref name } if name == "Nowhere"));
    }

    #[test]
    fn test_no_roots_rejected() {
        let index = chain();
        let request = TraversalRequest::new(Vec::<String>::new(), 1);
        assert!(matches!(
            index.traverse(&request),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_multi_root_shared_visited() {
        let index = chain();
        let result = index.traverse(&TraversalRequest::new(["A", "C"], 1)).unwrap();
        assert_eq!(names(&result), vec![("A", 0), ("C", 0), ("B", 1), ("D", 1)]);
        assert_eq!(result.roots.as_deref(), Some(&["A".to_string(), "C".to_string()][..]));
        assert!(result.root.is_none());
    }

    #[test]
    fn test_first_link_kind_wins() {
        let source = Document::new("S", "S.md")
            .with_link(LinkRef::embed("T", 1))
            .with_link(LinkRef::wikilink("T", 2));
        let index = GraphIndex::build(vec![source, Document::new("T", "T.md")]);
        let result = index.traverse(&TraversalRequest::new(["S"], 1)).unwrap();
        assert_eq!(result.notes[1].link_type, Some(LinkKind::Embed));
        assert_eq!(result.notes[0].link_type, None);
    }

    #[test]
    fn test_missing_links_deduplicated() {
        let index = GraphIndex::build(vec![
            note("A.md", &["Ghost", "ghost", "B"]),
            note("B.md", &["Ghost"]),
        ]);
        let result = index.traverse(&TraversalRequest::new(["A"], 2)).unwrap();
        assert_eq!(
            result.missing,
            vec![
                MissingLink {
                    target: "Ghost".into(),
                    source: "A".into()
                },
                MissingLink {
                    target: "Ghost".into(),
                    source: "B".into()
                },
            ]
        );
    }

    #[test]
    fn test_excluded_folder() {
        let index = GraphIndex::build(vec![
            note("A.md", &["Hidden", "Visible"]),
            note("archive/Hidden.md", &["Deep"]),
            note("Visible.md", &[]),
            note("Deep.md", &[]),
        ]);
        let request = TraversalRequest::new(["A"], 3).exclude_folder("archive");
        let result = index.traverse(&request).unwrap();
        assert_eq!(names(&result), vec![("A", 0), ("Visible", 1)]);
        assert!(result.missing.is_empty());

        // A root is reported even inside an excluded folder
        let request = TraversalRequest::new(["Hidden"], 1).exclude_folder("archive");
        let result = index.traverse(&request).unwrap();
        assert_eq!(names(&result), vec![("Hidden", 0), ("Deep", 1)]);
    }

    #[test]
    fn test_cycle_terminates() {
        let index = GraphIndex::build(vec![note("A.md", &["B"]), note("B.md", &["A"])]);
        let result = index.traverse(&TraversalRequest::new(["a"], 10)).unwrap();
        assert_eq!(names(&result), vec![("A", 0), ("B", 1)]);
        assert_eq!(result.root.as_deref(), Some("A"));
    }

    #[test]
    fn test_serialized_shape() {
        let index = chain();
        let single = index.traverse(&TraversalRequest::new(["A"], 1)).unwrap();
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["root"], "A");
        assert!(json.get("roots").is_none());
        assert_eq!(json["notes"][1]["link_type"], "wikilink");
        assert!(json["notes"][0]["link_type"].is_null());
    }
}
