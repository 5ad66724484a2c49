//! # NoteGraph Parser
//!
//! Turns raw markdown notes into [`Document`] records for the index.
//!
//! Extracted per note:
//! - YAML frontmatter (`tags`/`tag`, `aliases`/`alias`, the full mapping)
//! - Wikilinks `[[Note]]`, `[[Note#Heading|Alias]]` and embeds `![[Note]]`,
//!   in text order with 1-based line numbers
//! - Inline tags `#tag`, `#parent/child`
//! - Headings and checkable items
//!
//! Fenced code blocks and inline code spans are skipped.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::Utc;
//! use notegraph_parser::Parser;
//!
//! let content = "---\ntags: [important]\n---\n# Heading\n[[WikiLink]] and ![[Embedded]] #review\n";
//!
//! let doc = Parser::new()
//!     .parse_document("folder/My Note.md", content, Utc::now())
//!     .unwrap();
//!
//! assert_eq!(doc.name, "My Note");
//! assert_eq!(doc.links.len(), 2);
//! assert_eq!(doc.frontmatter_tags, vec!["important"]);
//! assert_eq!(doc.inline_tags, vec!["review"]);
//! ```

pub mod parsers;

pub use notegraph_core::Document;
pub use parsers::{Parser, note_name_from_path};
