//! Core data models shared by every NoteGraph crate.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Debuggable**: Derive Debug for easy inspection
//! - **Cloneable**: `Arc<T>` friendly for shared ownership
//! - **Type-Safe**: Enums replace magic strings
//!
//! A [`Document`] is produced once by the parser and never mutated by the
//! index; queries only ever borrow it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalization key used by every index map: `lowercase(trim(name))`.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a tag term for comparison: trim, strip one leading `#`, lowercase.
pub fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    trimmed
        .strip_prefix('#')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

/// Kind of an internal link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Wikilink: `[[Note]]`
    WikiLink,
    /// Embedded note: `![[Note]]`
    Embed,
}

impl LinkKind {
    /// Stable lowercase label (`"wikilink"` / `"embed"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WikiLink => "wikilink",
            Self::Embed => "embed",
        }
    }
}

/// One link occurrence in a document, in text order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LinkRef {
    /// Target note name as written (anchor and alias removed)
    pub target: String,
    /// Heading or block anchor after `#`
    pub anchor: Option<String>,
    /// Display alias after `|`
    pub alias: Option<String>,
    /// 1-based source line
    pub line: usize,
    pub kind: LinkKind,
}

impl LinkRef {
    /// Create a plain wikilink reference
    pub fn wikilink(target: impl Into<String>, line: usize) -> Self {
        Self {
            target: target.into(),
            anchor: None,
            alias: None,
            line,
            kind: LinkKind::WikiLink,
        }
    }

    /// Create an embed reference
    pub fn embed(target: impl Into<String>, line: usize) -> Self {
        Self {
            kind: LinkKind::Embed,
            ..Self::wikilink(target, line)
        }
    }

    /// Attach an anchor
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Attach a display alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Normalized key of the target
    pub fn target_key(&self) -> String {
        normalize_key(&self.target)
    }
}

/// A heading in document content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    pub level: u8, // 1-6
    pub line: usize,
}

/// A checkable item (`- [ ]` / `- [x]`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskItem {
    pub content: String,
    pub is_completed: bool,
    pub line: usize,
}

/// A single indexed note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Display identifier (file stem)
    pub name: String,
    /// Path relative to the store root, `/`-separated
    pub path: String,
    /// Body text with frontmatter stripped
    pub content: String,
    /// Link occurrences in text order, duplicates retained
    pub links: Vec<LinkRef>,
    pub frontmatter_tags: Vec<String>,
    pub inline_tags: Vec<String>,
    pub modified: DateTime<Utc>,

    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub headings: Vec<Heading>,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Document {
    /// Create an empty document with the given name and path
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: String::new(),
            links: Vec::new(),
            frontmatter_tags: Vec::new(),
            inline_tags: Vec::new(),
            modified: DateTime::<Utc>::default(),
            aliases: Vec::new(),
            headings: Vec::new(),
            tasks: Vec::new(),
            frontmatter: None,
        }
    }

    /// Set body text
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Append a link occurrence
    pub fn with_link(mut self, link: LinkRef) -> Self {
        self.links.push(link);
        self
    }

    /// Set frontmatter tags
    pub fn with_frontmatter_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frontmatter_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set inline tags
    pub fn with_inline_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inline_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set modification time
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = modified;
        self
    }

    /// Normalized key of this document
    pub fn key(&self) -> String {
        normalize_key(&self.name)
    }

    /// Frontmatter tags followed by inline tags not already present
    /// (case-insensitive).
    pub fn effective_tags(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.frontmatter_tags
            .iter()
            .chain(self.inline_tags.iter())
            .filter(|tag| seen.insert(normalize_tag(tag)))
            .cloned()
            .collect()
    }

    /// Check whether the effective tag set contains `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        !wanted.is_empty()
            && self
                .frontmatter_tags
                .iter()
                .chain(self.inline_tags.iter())
                .any(|t| normalize_tag(t) == wanted)
    }

    /// True when the effective tag set is empty
    pub fn is_untagged(&self) -> bool {
        self.frontmatter_tags.is_empty() && self.inline_tags.is_empty()
    }

    /// Number of link occurrences pointing at `target_key`
    pub fn reference_count(&self, target_key: &str) -> usize {
        self.links
            .iter()
            .filter(|link| link.target_key() == target_key)
            .count()
    }
}
