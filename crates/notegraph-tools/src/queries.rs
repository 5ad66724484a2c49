//! Query operations over one index snapshot
//!
//! Every operation borrows a [`GraphIndex`] and returns a serializable
//! value. A name that does not resolve becomes `{"error": "..."}` through
//! [`Reply::Failed`] instead of a Rust error.

use crate::filter::{CompiledFilter, FilterSpec, Page, PageRequest};
use crate::search::{self, ContentMatch, NoteSummary, SearchMode, SimilarName, TagCount};
use notegraph_core::prelude::*;
use notegraph_graph::{GraphIndex, MatchKind, Traversal, TraversalRequest};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;

/// Value-level success or failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Ok(T),
    Failed { error: String },
}

impl<T> Reply<T> {
    pub fn failed(error: impl Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

impl<T> From<Result<T>> for Reply<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::failed(e),
        }
    }
}

/// A name and the note it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNote {
    pub query: String,
    pub name: String,
    pub path: String,
    pub match_kind: MatchKind,
}

/// Full view of one note
#[derive(Debug, Clone, Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub document: Document,
    /// Effective tags
    pub tags: Vec<String>,
    pub backlink_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklinkEntry {
    pub name: String,
    pub path: String,
    /// Link occurrences in the source pointing at the note
    pub references: usize,
}

/// Notes linking to `note`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backlinks {
    pub note: String,
    #[serde(flatten)]
    pub page: Page<BacklinkEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardLink {
    /// Target as first written in the note
    pub target: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Kind of the first link to this target
    pub link_type: LinkKind,
    pub references: usize,
}

/// Distinct targets of `note`, in link order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardLinks {
    pub note: String,
    #[serde(flatten)]
    pub page: Page<ForwardLink>,
}

/// A link target with no note, and who links to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingNote {
    pub target: String,
    pub count: usize,
    pub referrers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_notes: usize,
    pub tagged: usize,
    pub untagged: usize,
    pub orphans: usize,
    /// Distinct missing targets referenced from notes in scope
    pub missing_links: usize,
}

/// One failed item of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchError {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResolve {
    pub resolved: Vec<ResolvedNote>,
    pub errors: Vec<BatchError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResults<T> {
    pub results: Vec<T>,
    pub errors: Vec<BatchError>,
}

/// Query operations bound to one index snapshot
#[derive(Debug, Clone, Copy)]
pub struct QueryTools<'a> {
    index: &'a GraphIndex,
}

impl<'a> QueryTools<'a> {
    pub fn new(index: &'a GraphIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a GraphIndex {
        self.index
    }

    fn locate(&self, name: &str) -> Result<&'a Document> {
        self.index
            .resolve_document(name)
            .ok_or_else(|| Error::not_found(name))
    }

    fn try_resolve(&self, name: &str) -> Result<ResolvedNote> {
        let resolved = self
            .index
            .resolve(name)
            .ok_or_else(|| Error::not_found(name))?;
        Ok(ResolvedNote {
            query: name.to_string(),
            name: resolved.document.name.clone(),
            path: resolved.document.path.clone(),
            match_kind: resolved.match_kind,
        })
    }

    /// Resolve one name, exact then fuzzy
    pub fn resolve_note(&self, name: &str) -> Reply<ResolvedNote> {
        self.try_resolve(name).into()
    }

    /// Resolve many names; failures are collected, not fatal
    pub fn resolve_notes(&self, names: &[String]) -> BatchResolve {
        let mut resolved = Vec::new();
        let mut errors = Vec::new();
        for name in names {
            match self.try_resolve(name) {
                Ok(note) => resolved.push(note),
                Err(e) => errors.push(BatchError {
                    name: name.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        BatchResolve { resolved, errors }
    }

    pub fn read_note(&self, name: &str) -> Reply<NoteView> {
        self.locate(name)
            .map(|doc| NoteView {
                document: doc.clone(),
                tags: doc.effective_tags(),
                backlink_count: self.index.backward(&doc.key()).map_or(0, |s| s.len()),
            })
            .into()
    }

    fn try_backlinks(
        &self,
        name: &str,
        filter: &CompiledFilter,
        page: &PageRequest,
    ) -> Result<Backlinks> {
        let doc = self.locate(name)?;
        let key = doc.key();
        let entries = self
            .index
            .backward(&key)
            .into_iter()
            .flatten()
            .filter_map(|source| self.index.document(source))
            .filter(|source| filter.matches(source))
            .map(|source| BacklinkEntry {
                name: source.name.clone(),
                path: source.path.clone(),
                references: source.reference_count(&key),
            })
            .collect();

        Ok(Backlinks {
            note: doc.name.clone(),
            page: page.apply(entries),
        })
    }

    /// Notes linking to `name`, ordered by source key, filter applied to sources
    pub fn backlinks(
        &self,
        name: &str,
        filter: &FilterSpec,
        page: &PageRequest,
    ) -> Reply<Backlinks> {
        self.try_backlinks(name, &filter.compile(), page).into()
    }

    pub fn backlinks_batch(
        &self,
        names: &[String],
        filter: &FilterSpec,
        page: &PageRequest,
    ) -> BatchResults<Backlinks> {
        let compiled = filter.compile();
        let mut results = Vec::new();
        let mut errors = Vec::new();
        for name in names {
            match self.try_backlinks(name, &compiled, page) {
                Ok(backlinks) => results.push(backlinks),
                Err(e) => errors.push(BatchError {
                    name: name.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        BatchResults { results, errors }
    }

    /// Distinct targets of a note in the order they are first linked
    pub fn forward_links(&self, name: &str, page: &PageRequest) -> Reply<ForwardLinks> {
        let doc = match self.locate(name) {
            Ok(doc) => doc,
            Err(e) => return Reply::failed(e),
        };

        let mut seen = HashSet::new();
        let links = doc
            .links
            .iter()
            .filter(|link| seen.insert(link.target_key()))
            .filter(|link| !link.target_key().is_empty())
            .map(|link| {
                let key = link.target_key();
                let target = self.index.document(&key);
                ForwardLink {
                    target: link.target.trim().to_string(),
                    exists: target.is_some(),
                    path: target.map(|t| t.path.clone()),
                    link_type: link.kind,
                    references: doc.reference_count(&key),
                }
            })
            .collect();

        Reply::Ok(ForwardLinks {
            note: doc.name.clone(),
            page: page.apply(links),
        })
    }

    pub fn traverse(&self, request: &TraversalRequest) -> Reply<Traversal> {
        self.index.traverse(request).into()
    }

    /// Notes nothing links to
    pub fn orphans(&self, filter: &FilterSpec, page: &PageRequest) -> Page<NoteSummary> {
        let notes = self
            .sorted(filter)
            .into_iter()
            .filter(|doc| self.is_orphan(doc))
            .map(NoteSummary::from)
            .collect();
        page.apply(notes)
    }

    /// Link targets with no note, most referenced first.
    ///
    /// Only referrers passing the filter are counted; a target left with
    /// none is dropped.
    pub fn missing_notes(&self, filter: &FilterSpec, page: &PageRequest) -> Page<MissingNote> {
        let filter = filter.compile();
        let mut missing: Vec<MissingNote> = self
            .index
            .broken()
            .iter()
            .filter_map(|(target, sources)| {
                let referrers: Vec<String> = sources
                    .iter()
                    .filter_map(|source| self.index.document(source))
                    .filter(|source| filter.matches(source))
                    .map(|source| source.name.clone())
                    .collect();
                (!referrers.is_empty()).then(|| MissingNote {
                    target: self.index.target_name(target).to_string(),
                    count: referrers.len(),
                    referrers,
                })
            })
            .collect();

        // broken() iterates in key order, so equal counts stay ordered by name
        missing.sort_by(|a, b| b.count.cmp(&a.count));
        page.apply(missing)
    }

    pub fn search(
        &self,
        query: &str,
        mode: SearchMode,
        include_names: bool,
        filter: &FilterSpec,
        page: &PageRequest,
    ) -> Page<ContentMatch> {
        search::search_content(self.index, query, mode, include_names, &filter.compile(), page)
    }

    pub fn notes_with_tag(
        &self,
        tag: &str,
        filter: &FilterSpec,
        page: &PageRequest,
    ) -> Page<NoteSummary> {
        search::notes_with_tag(self.index, tag, &filter.compile(), page)
    }

    pub fn untagged_notes(&self, filter: &FilterSpec, page: &PageRequest) -> Page<NoteSummary> {
        search::untagged_notes(self.index, &filter.compile(), page)
    }

    pub fn list_tags(&self, filter: &FilterSpec, page: &PageRequest) -> Page<TagCount> {
        search::list_tags(self.index, &filter.compile(), page)
    }

    pub fn similar_names(
        &self,
        name: &str,
        max_distance: usize,
        filter: &FilterSpec,
        page: &PageRequest,
    ) -> Page<SimilarName> {
        search::similar_names(self.index, name, max_distance, &filter.compile(), page)
    }

    /// All notes passing the filter, ordered by key
    pub fn list_notes(&self, filter: &FilterSpec, page: &PageRequest) -> Page<NoteSummary> {
        let notes = self.sorted(filter).into_iter().map(NoteSummary::from).collect();
        page.apply(notes)
    }

    pub fn stats(&self, filter: &FilterSpec) -> IndexStats {
        let in_scope = filter.compile().apply(self.index.documents());

        let tagged = in_scope.iter().filter(|doc| !doc.is_untagged()).count();
        let orphans = in_scope.iter().filter(|doc| self.is_orphan(doc)).count();
        let scope_keys: HashSet<String> = in_scope.iter().map(|doc| doc.key()).collect();
        let missing_links = self
            .index
            .broken()
            .values()
            .filter(|sources| sources.iter().any(|s| scope_keys.contains(s)))
            .count();

        IndexStats {
            total_notes: in_scope.len(),
            tagged,
            untagged: in_scope.len() - tagged,
            orphans,
            missing_links,
        }
    }

    fn sorted(&self, filter: &FilterSpec) -> Vec<&'a Document> {
        let mut docs = filter.compile().apply(self.index.documents());
        docs.sort_by_cached_key(|doc| doc.key());
        docs
    }

    fn is_orphan(&self, doc: &Document) -> bool {
        self.index
            .backward(&doc.key())
            .is_none_or(|sources| sources.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> GraphIndex {
        GraphIndex::build(vec![
            Document::new("Hub", "Hub.md")
                .with_link(LinkRef::wikilink("Spoke", 1))
                .with_link(LinkRef::embed("Diagram", 2))
                .with_link(LinkRef::wikilink("spoke", 3))
                .with_frontmatter_tags(["index"]),
            Document::new("Spoke", "sub/Spoke.md").with_link(LinkRef::wikilink("Diagram", 1)),
            Document::new("Lonely", "Lonely.md"),
        ])
    }

    #[test]
    fn test_reply_serialization() {
        let ok: Reply<u32> = Reply::Ok(3);
        assert_eq!(serde_json::to_value(&ok).unwrap(), serde_json::json!(3));
        let failed: Reply<u32> = Reply::failed(Error::not_found("X"));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "Note not found: X"})
        );
    }

    #[test]
    fn test_resolve_note_fuzzy() {
        let index = index();
        let tools = QueryTools::new(&index);
        let resolved = tools.resolve_note("HUB").ok().unwrap();
        assert_eq!(resolved.match_kind, MatchKind::Exact);
        assert!(tools.resolve_note("Nowhere").error().is_some());
    }

    #[test]
    fn test_resolve_notes_partial_success() {
        let index = index();
        let batch =
            QueryTools::new(&index).resolve_notes(&["hub".to_string(), "ghost".to_string()]);
        assert_eq!(batch.resolved.len(), 1);
        assert_eq!(batch.errors[0].name, "ghost");
        assert!(batch.errors[0].reason.contains("ghost"));
    }

    #[test]
    fn test_backlinks_with_reference_counts() {
        let index = index();
        let tools = QueryTools::new(&index);
        let backlinks = tools
            .backlinks("spoke", &FilterSpec::default(), &PageRequest::default())
            .ok()
            .unwrap();
        assert_eq!(backlinks.note, "Spoke");
        assert_eq!(backlinks.page.total, 1);
        assert_eq!(backlinks.page.results[0].references, 2);
    }

    #[test]
    fn test_forward_links_in_link_order() {
        let index = index();
        let forward = QueryTools::new(&index)
            .forward_links("Hub", &PageRequest::default())
            .ok()
            .unwrap();
        let targets: Vec<_> = forward
            .page
            .results
            .iter()
            .map(|l| (l.target.as_str(), l.exists, l.link_type))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("Spoke", true, LinkKind::WikiLink),
                ("Diagram", false, LinkKind::Embed)
            ]
        );
    }

    #[test]
    fn test_orphans_and_missing() {
        let index = index();
        let tools = QueryTools::new(&index);

        let orphans = tools.orphans(&FilterSpec::default(), &PageRequest::default());
        let names: Vec<_> = orphans.results.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Hub", "Lonely"]);

        let missing = tools.missing_notes(&FilterSpec::default(), &PageRequest::default());
        assert_eq!(missing.results[0].target, "Diagram");
        assert_eq!(missing.results[0].count, 2);

        let scoped =
            tools.missing_notes(&FilterSpec::new().folder("sub"), &PageRequest::default());
        assert_eq!(scoped.results[0].referrers, vec!["Spoke"]);
    }

    #[test]
    fn test_stats() {
        let index = index();
        let stats = QueryTools::new(&index).stats(&FilterSpec::default());
        assert_eq!(
            stats,
            IndexStats {
                total_notes: 3,
                tagged: 1,
                untagged: 2,
                orphans: 2,
                missing_links: 1,
            }
        );

        let lonely_only =
            QueryTools::new(&index).stats(&FilterSpec::new().exclude_pattern("hub|spoke"));
        assert_eq!(lonely_only.total_notes, 1);
        assert_eq!(lonely_only.missing_links, 0);
    }

    #[test]
    fn test_read_note() {
        let index = index();
        let note = QueryTools::new(&index).read_note("spoke").ok().unwrap();
        assert_eq!(note.document.path, "sub/Spoke.md");
        assert_eq!(note.backlink_count, 1);
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["name"], "Spoke");
    }
}
