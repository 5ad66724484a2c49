//! Line search, tag lookup and name similarity over a [`GraphIndex`]
//!
//! Every function narrows its candidates with a [`CompiledFilter`] before
//! ordering and paging.

use crate::filter::{CompiledFilter, Page, PageRequest};
use notegraph_core::prelude::*;
use notegraph_graph::GraphIndex;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Text of the synthetic match emitted for a name hit
pub const NAME_MATCH_MARKER: &str = "[name match]";

/// How a content query is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Substring,
    WholeWord,
    Regex,
}

impl SearchMode {
    /// Case-insensitive matcher for `query`
    fn matcher(self, query: &str) -> std::result::Result<Regex, regex::Error> {
        let pattern = match self {
            Self::Substring => regex::escape(query),
            Self::WholeWord => format!(r"\b{}\b", regex::escape(query)),
            Self::Regex => query.to_string(),
        };
        RegexBuilder::new(&pattern).case_insensitive(true).build()
    }
}

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentMatch {
    /// Note name
    pub file: String,
    pub path: String,
    /// 1-based line, 0 for a name match
    pub line: usize,
    pub text: String,
}

/// Compact description of a note in list results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    pub name: String,
    pub path: String,
    pub tags: Vec<String>,
}

impl From<&Document> for NoteSummary {
    fn from(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            path: doc.path.clone(),
            tags: doc.effective_tags(),
        }
    }
}

/// Number of notes carrying a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// A note whose name is close to the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarName {
    pub name: String,
    pub path: String,
    pub distance: usize,
}

/// Edit distance over Unicode code points (unit costs)
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Filtered documents ordered by key
fn candidates<'a>(index: &'a GraphIndex, filter: &CompiledFilter) -> Vec<&'a Document> {
    let mut docs = filter.apply(index.documents());
    docs.sort_by_cached_key(|doc| doc.key());
    docs
}

/// Search note content line by line.
///
/// With `include_names`, a note whose name matches gets one extra result
/// (line 0, text [`NAME_MATCH_MARKER`]) ahead of its content matches. An
/// invalid regex or an empty query yields an empty page.
#[instrument(skip(index, filter, page))]
pub fn search_content(
    index: &GraphIndex,
    query: &str,
    mode: SearchMode,
    include_names: bool,
    filter: &CompiledFilter,
    page: &PageRequest,
) -> Page<ContentMatch> {
    if query.trim().is_empty() {
        return page.apply(Vec::new());
    }

    let matcher = match mode.matcher(query) {
        Ok(matcher) => matcher,
        Err(e) => {
            log::warn!("Invalid search pattern '{}': {}", query, e);
            return page.apply(Vec::new());
        }
    };

    let mut matches = Vec::new();
    for doc in candidates(index, filter) {
        if include_names && matcher.is_match(&doc.name) {
            matches.push(ContentMatch {
                file: doc.name.clone(),
                path: doc.path.clone(),
                line: 0,
                text: NAME_MATCH_MARKER.to_string(),
            });
        }

        for (idx, line) in doc.content.lines().enumerate() {
            if matcher.is_match(line) {
                matches.push(ContentMatch {
                    file: doc.name.clone(),
                    path: doc.path.clone(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                });
            }
        }
    }

    log::debug!("Search '{}' matched {} lines", query, matches.len());
    page.apply(matches)
}

/// Notes whose effective tags contain `tag` (leading `#` ignored)
pub fn notes_with_tag(
    index: &GraphIndex,
    tag: &str,
    filter: &CompiledFilter,
    page: &PageRequest,
) -> Page<NoteSummary> {
    if normalize_tag(tag).is_empty() {
        return page.apply(Vec::new());
    }

    let notes = candidates(index, filter)
        .into_iter()
        .filter(|doc| doc.has_tag(tag))
        .map(NoteSummary::from)
        .collect();
    page.apply(notes)
}

/// Notes with no tags at all
pub fn untagged_notes(
    index: &GraphIndex,
    filter: &CompiledFilter,
    page: &PageRequest,
) -> Page<NoteSummary> {
    let notes = candidates(index, filter)
        .into_iter()
        .filter(|doc| doc.is_untagged())
        .map(NoteSummary::from)
        .collect();
    page.apply(notes)
}

/// Every tag in use with its note count, most used first
pub fn list_tags(
    index: &GraphIndex,
    filter: &CompiledFilter,
    page: &PageRequest,
) -> Page<TagCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for doc in filter.apply(index.documents()) {
        for tag in doc.effective_tags() {
            *counts.entry(normalize_tag(&tag)).or_default() += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    // stable sort keeps tag order within equal counts
    tags.sort_by(|a, b| b.count.cmp(&a.count));
    page.apply(tags)
}

/// Notes whose lowercased name is within `max_distance` edits of `name`.
///
/// The note whose key equals the query is left out. Ordered by distance,
/// then name.
pub fn similar_names(
    index: &GraphIndex,
    name: &str,
    max_distance: usize,
    filter: &CompiledFilter,
    page: &PageRequest,
) -> Page<SimilarName> {
    let query_key = normalize_key(name);
    let query = name.trim().to_lowercase();

    let mut similar: Vec<SimilarName> = filter
        .apply(index.documents())
        .into_iter()
        .filter(|doc| doc.key() != query_key)
        .filter_map(|doc| {
            let distance = levenshtein(&query, &doc.name.to_lowercase());
            (distance <= max_distance).then(|| SimilarName {
                name: doc.name.clone(),
                path: doc.path.clone(),
                distance,
            })
        })
        .collect();

    similar.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.name.cmp(&b.name)));
    page.apply(similar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterSpec;

    fn index() -> GraphIndex {
        GraphIndex::build(vec![
            Document::new("Rust Notes", "Rust Notes.md")
                .with_content("Ownership rules\nthe borrow checker\nTrust the process")
                .with_frontmatter_tags(["lang", "rust"]),
            Document::new("Async", "Async.md")
                .with_content("tokio runtime\nRUST futures")
                .with_inline_tags(["rust"]),
            Document::new("Groceries", "Groceries.md").with_content("milk\neggs"),
        ])
    }

    fn all() -> CompiledFilter {
        CompiledFilter::pass_all()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_substring_search_case_insensitive() {
        let page = search_content(
            &index(),
            "rust",
            SearchMode::Substring,
            false,
            &all(),
            &PageRequest::default(),
        );
        let hits: Vec<_> = page.results.iter().map(|m| (m.file.as_str(), m.line)).collect();
        // documents in key order, lines ascending
        assert_eq!(hits, vec![("Async", 2), ("Rust Notes", 3)]);
        assert_eq!(page.results[0].text, "RUST futures");
    }

    #[test]
    fn test_whole_word_search() {
        let page = search_content(
            &index(),
            "rust",
            SearchMode::WholeWord,
            false,
            &all(),
            &PageRequest::default(),
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].file, "Async");
    }

    #[test]
    fn test_regex_search_and_invalid_pattern() {
        let index = index();
        let page = search_content(
            &index,
            r"^(milk|eggs)$",
            SearchMode::Regex,
            false,
            &all(),
            &PageRequest::default(),
        );
        assert_eq!(page.total, 2);

        let bad = search_content(
            &index,
            "(unclosed",
            SearchMode::Regex,
            false,
            &all(),
            &PageRequest::default(),
        );
        assert_eq!(bad.total, 0);
        assert!(bad.results.is_empty());
    }

    #[test]
    fn test_name_match_comes_first() {
        let page = search_content(
            &index(),
            "notes",
            SearchMode::Substring,
            true,
            &all(),
            &PageRequest::default(),
        );
        assert_eq!(page.results[0].line, 0);
        assert_eq!(page.results[0].text, NAME_MATCH_MARKER);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_search_respects_filter() {
        let filter = FilterSpec::new().exclude_pattern("async").compile();
        let page = search_content(
            &index(),
            "rust",
            SearchMode::Substring,
            false,
            &filter,
            &PageRequest::default(),
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].file, "Rust Notes");
    }

    #[test]
    fn test_tag_lookup() {
        let page = notes_with_tag(&index(), "#RUST", &all(), &PageRequest::default());
        let names: Vec<_> = page.results.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Async", "Rust Notes"]);
        assert!(notes_with_tag(&index(), "#", &all(), &PageRequest::default()).results.is_empty());
    }

    #[test]
    fn test_untagged() {
        let page = untagged_notes(&index(), &all(), &PageRequest::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].name, "Groceries");
    }

    #[test]
    fn test_list_tags() {
        let page = list_tags(&index(), &all(), &PageRequest::default());
        assert_eq!(
            page.results,
            vec![
                TagCount {
                    tag: "rust".into(),
                    count: 2
                },
                TagCount {
                    tag: "lang".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_similar_names() {
        let index = GraphIndex::build(vec![
            Document::new("Meeting Notes", "a.md"),
            Document::new("Meting Notes", "b.md"),
            Document::new("Meeting Note", "c.md"),
            Document::new("Something Else", "d.md"),
        ]);
        let page = similar_names(&index, "meeting notes", 3, &all(), &PageRequest::default());
        let found: Vec<_> = page
            .results
            .iter()
            .map(|s| (s.name.as_str(), s.distance))
            .collect();
        assert_eq!(found, vec![("Meeting Note", 1), ("Meting Notes", 1)]);
    }
}
