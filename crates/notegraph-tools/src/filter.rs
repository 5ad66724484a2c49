//! Document filters and result paging shared by every list operation

use chrono::{DateTime, NaiveDate, Utc};
use notegraph_core::prelude::*;
use notegraph_core::{DEFAULT_PAGE_LIMIT, normalize_folder, path_in_folder};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Filter arguments as supplied by a caller. Unset fields pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Only notes under this folder
    pub folder: Option<String>,
    /// Skip notes under any of these folders
    #[serde(alias = "excludeFolders")]
    pub exclude_folders: Vec<String>,
    /// Case-insensitive regex; notes whose name matches are skipped
    #[serde(alias = "excludePattern")]
    pub exclude_pattern: Option<String>,
    /// Keep notes carrying any of these tags
    pub tags: Vec<String>,
    /// Skip notes carrying any of these tags
    #[serde(alias = "excludeTags")]
    pub exclude_tags: Vec<String>,
    /// Inclusive lower bound, RFC 3339 or `YYYY-MM-DD`
    #[serde(alias = "modifiedAfter")]
    pub modified_after: Option<String>,
    /// Exclusive upper bound, RFC 3339 or `YYYY-MM-DD`
    #[serde(alias = "modifiedBefore")]
    pub modified_before: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn exclude_folder(mut self, folder: impl Into<String>) -> Self {
        self.exclude_folders.push(folder.into());
        self
    }

    pub fn exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_pattern = Some(pattern.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn exclude_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclude_tags.push(tag.into());
        self
    }

    pub fn modified_after(mut self, bound: impl Into<String>) -> Self {
        self.modified_after = Some(bound.into());
        self
    }

    pub fn modified_before(mut self, bound: impl Into<String>) -> Self {
        self.modified_before = Some(bound.into());
        self
    }

    /// Compile into a reusable predicate.
    ///
    /// A pattern or date that fails to parse yields a filter that matches
    /// nothing; the problem is logged, never returned.
    pub fn compile(&self) -> CompiledFilter {
        let mut filter = CompiledFilter {
            folder: self
                .folder
                .as_deref()
                .map(normalize_folder)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            exclude_folders: self
                .exclude_folders
                .iter()
                .map(|f| normalize_folder(f).to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            exclude_pattern: None,
            include_tags: normalized_tags(&self.tags),
            exclude_tags: normalized_tags(&self.exclude_tags),
            after: None,
            before: None,
            rejects_all: false,
        };

        if let Some(pattern) = self.exclude_pattern.as_deref().filter(|p| !p.is_empty()) {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(regex) => filter.exclude_pattern = Some(regex),
                Err(e) => {
                    log::warn!("Invalid exclude pattern '{}': {}", pattern, e);
                    filter.rejects_all = true;
                }
            }
        }

        for (bound, slot) in [
            (&self.modified_after, &mut filter.after),
            (&self.modified_before, &mut filter.before),
        ] {
            let Some(raw) = bound.as_deref().map(str::trim).filter(|b| !b.is_empty()) else {
                continue;
            };
            match parse_date_bound(raw) {
                Ok(parsed) => *slot = Some(parsed),
                Err(e) => {
                    log::warn!("{}", e);
                    filter.rejects_all = true;
                }
            }
        }

        filter
    }
}

fn normalized_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::invalid_argument(format!("Unparseable date bound: {}", raw)))
}

/// Conjunction of every active predicate of a [`FilterSpec`]
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    folder: Option<String>,
    exclude_folders: Vec<String>,
    exclude_pattern: Option<Regex>,
    include_tags: Vec<String>,
    exclude_tags: Vec<String>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    rejects_all: bool,
}

impl CompiledFilter {
    /// A filter that passes every document
    pub fn pass_all() -> Self {
        Self::default()
    }

    /// True when a malformed argument closed the filter
    pub fn rejects_all(&self) -> bool {
        self.rejects_all
    }

    pub fn matches(&self, doc: &Document) -> bool {
        if self.rejects_all {
            return false;
        }

        if let Some(folder) = &self.folder
            && !path_in_folder(&doc.path, folder)
        {
            return false;
        }

        if self
            .exclude_folders
            .iter()
            .any(|folder| path_in_folder(&doc.path, folder))
        {
            return false;
        }

        if let Some(pattern) = &self.exclude_pattern
            && pattern.is_match(&doc.name)
        {
            return false;
        }

        if !self.include_tags.is_empty() || !self.exclude_tags.is_empty() {
            let tags: Vec<String> = doc
                .effective_tags()
                .iter()
                .map(|t| normalize_tag(t))
                .collect();
            if !self.include_tags.is_empty()
                && !self.include_tags.iter().any(|t| tags.contains(t))
            {
                return false;
            }
            if self.exclude_tags.iter().any(|t| tags.contains(t)) {
                return false;
            }
        }

        if let Some(after) = self.after
            && doc.modified < after
        {
            return false;
        }

        if let Some(before) = self.before
            && doc.modified >= before
        {
            return false;
        }

        true
    }

    /// Keep matching documents, preserving order
    pub fn apply<'a, I>(&self, documents: I) -> Vec<&'a Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        if self.rejects_all {
            return Vec::new();
        }
        documents.into_iter().filter(|doc| self.matches(doc)).collect()
    }
}

/// Requested window of a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Cut one page out of the full ordered result list
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let results = items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect();
        Page {
            total,
            offset: self.offset,
            limit: self.limit,
            results,
        }
    }
}

/// One page of a list result; `total` counts the full filtered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(path: &str, tags: &[&str], modified: DateTime<Utc>) -> Document {
        let name = path.rsplit('/').next().unwrap().trim_end_matches(".md");
        Document::new(name, path)
            .with_frontmatter_tags(tags.iter().copied())
            .with_modified(modified)
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc("Projects/Alpha.md", &["project", "active"], day(1)),
            doc("Projects/Archive/Beta.md", &["project"], day(5)),
            doc("Daily/2024-03-10.md", &[], day(10)),
            doc("Inbox.md", &["#Inbox"], day(15)),
        ]
    }

    fn names(filter: &FilterSpec) -> Vec<String> {
        let docs = corpus();
        filter
            .compile()
            .apply(&docs)
            .into_iter()
            .map(|d| d.name.clone())
            .collect()
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        assert_eq!(names(&FilterSpec::new()).len(), 4);
        assert_eq!(names(&FilterSpec::new().folder("/")).len(), 4);
    }

    #[test]
    fn test_folder_scope() {
        assert_eq!(names(&FilterSpec::new().folder("Projects")), vec!["Alpha", "Beta"]);
        assert_eq!(names(&FilterSpec::new().folder("./Projects/")), vec!["Alpha", "Beta"]);
        assert!(names(&FilterSpec::new().folder("Proj")).is_empty());
    }

    #[test]
    fn test_exclude_folders() {
        let filter = FilterSpec::new()
            .folder("Projects")
            .exclude_folder("Projects/Archive");
        assert_eq!(names(&filter), vec!["Alpha"]);
    }

    #[test]
    fn test_exclude_pattern_case_insensitive() {
        assert_eq!(
            names(&FilterSpec::new().exclude_pattern("^2024|INBOX")),
            vec!["Alpha", "Beta"]
        );
    }

    #[test]
    fn test_invalid_pattern_fails_closed() {
        let filter = FilterSpec::new().exclude_pattern("[invalid").compile();
        assert!(filter.rejects_all());
        assert!(filter.apply(&corpus()).is_empty());
    }

    #[test]
    fn test_tag_include_and_exclude() {
        assert_eq!(names(&FilterSpec::new().tag("#inbox")), vec!["Inbox"]);
        assert_eq!(
            names(&FilterSpec::new().tag("active").tag("inbox")),
            vec!["Alpha", "Inbox"]
        );
        assert_eq!(
            names(&FilterSpec::new().tag("PROJECT").exclude_tag("active")),
            vec!["Beta"]
        );
    }

    #[test]
    fn test_date_bounds_inclusive_exclusive() {
        let filter = FilterSpec::new()
            .modified_after("2024-03-05T12:00:00Z")
            .modified_before("2024-03-15T12:00:00Z");
        assert_eq!(names(&filter), vec!["Beta", "2024-03-10"]);

        assert_eq!(names(&FilterSpec::new().modified_after("2024-03-11")), vec!["Inbox"]);
    }

    #[test]
    fn test_unparseable_date_fails_closed() {
        assert!(names(&FilterSpec::new().modified_before("last tuesday")).is_empty());
    }

    #[test]
    fn test_parse_date_bound() {
        assert_eq!(
            parse_date_bound("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date_bound("2024-03-01T02:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_date_bound("03/01/2024").is_err());
    }

    #[test]
    fn test_pagination_window() {
        let items: Vec<usize> = (0..7).collect();
        for (limit, offset) in [(3, 0), (3, 6), (0, 2), (50, 0), (2, 10)] {
            let page = PageRequest::new(limit, offset).apply(items.clone());
            let expected: Vec<usize> = items.iter().copied().skip(offset).take(limit).collect();
            assert_eq!(page.total, 7);
            assert!(page.results.len() <= limit);
            assert_eq!(page.results, expected);
        }
    }

    #[test]
    fn test_page_request_defaults() {
        let page: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.limit, 50);
    }

    #[test]
    fn test_filter_spec_deserialize() {
        let parsed: FilterSpec =
            serde_json::from_str(r#"{"folder": "Projects", "tags": ["a"]}"#).unwrap();
        assert_eq!(parsed.folder.as_deref(), Some("Projects"));
        assert_eq!(parsed.tags, vec!["a"]);
        assert!(parsed.exclude_folders.is_empty());
    }
}
