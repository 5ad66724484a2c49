//! Line-oriented note parser built on regex layers

use chrono::{DateTime, Utc};
use notegraph_core::{Document, Result, normalize_tag};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

pub mod frontmatter_parser;
pub mod headings;
pub mod tags;
pub mod tasks;
pub mod wikilinks;

pub use self::frontmatter_parser::extract_frontmatter;

/// Matches `inline code` spans, which never contain links or tags
static INLINE_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]*`").unwrap());

/// Main parser for markdown notes
#[derive(Debug, Clone, Default)]
pub struct Parser {
    /// Keep documents whose frontmatter fails to parse (frontmatter ignored)
    lenient_frontmatter: bool,
}

impl Parser {
    /// Create a parser that keeps notes with broken frontmatter
    pub fn new() -> Self {
        Self {
            lenient_frontmatter: true,
        }
    }

    /// Create a parser that rejects notes with broken frontmatter
    pub fn strict() -> Self {
        Self {
            lenient_frontmatter: false,
        }
    }

    /// Parse a note given its store-relative path, raw text and modification time.
    ///
    /// The document name is the file stem of `rel_path`. Line endings are
    /// normalized to `\n`; line numbers count from the first line after the
    /// frontmatter block.
    pub fn parse_document(
        &self,
        rel_path: &str,
        raw: &str,
        modified: DateTime<Utc>,
    ) -> Result<Document> {
        let normalized = raw.replace("\r\n", "\n");
        let (fm_str, body) = extract_frontmatter(&normalized);

        let mut doc = Document::new(note_name_from_path(rel_path), rel_path)
            .with_content(body)
            .with_modified(modified);

        if let Some(fm_str) = fm_str {
            match frontmatter_parser::parse_frontmatter(fm_str) {
                Ok(Some(map)) => {
                    doc.frontmatter_tags = frontmatter_parser::frontmatter_tags(&map);
                    doc.aliases = frontmatter_parser::frontmatter_aliases(&map);
                    doc.frontmatter = Some(map);
                }
                Ok(None) => {}
                Err(e) if self.lenient_frontmatter => {
                    log::warn!("Ignoring frontmatter of {}: {}", rel_path, e);
                }
                Err(e) => return Err(e),
            }
        }

        self.parse_body(&mut doc);
        Ok(doc)
    }

    /// Extract links, tags, headings and tasks line by line, skipping fenced code
    fn parse_body(&self, doc: &mut Document) {
        let mut seen_tags: HashSet<String> =
            doc.frontmatter_tags.iter().map(|t| normalize_tag(t)).collect();
        let mut in_fence: Option<&str> = None;

        for (idx, line) in doc.content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim_start();

            if let Some(fence) = in_fence {
                if trimmed.starts_with(fence) {
                    in_fence = None;
                }
                continue;
            }
            if trimmed.starts_with("```") {
                in_fence = Some("```");
                continue;
            }
            if trimmed.starts_with("~~~") {
                in_fence = Some("~~~");
                continue;
            }

            if let Some(heading) = headings::parse_heading(line, line_no) {
                doc.headings.push(heading);
            }
            if let Some(task) = tasks::parse_task(line, line_no) {
                doc.tasks.push(task);
            }

            let visible = INLINE_CODE_PATTERN.replace_all(line, " ");
            doc.links.extend(wikilinks::parse_links(&visible, line_no));
            for tag in tags::parse_tags(&visible) {
                if seen_tags.insert(normalize_tag(&tag)) {
                    doc.inline_tags.push(tag);
                }
            }
        }
    }
}

/// File stem of a `/`-separated path
pub fn note_name_from_path(rel_path: &str) -> String {
    let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
