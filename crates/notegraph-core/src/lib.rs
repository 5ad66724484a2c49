//! # NoteGraph Core
//!
//! Core data models, error types, and configuration for the note index.
//! This crate defines the canonical types that all other crates depend on.
//!
//! ## Architecture Principles
//!
//! - **Type-Driven Design**: Strong types replace string-based APIs
//! - **Zero Panic in Libraries**: All errors are `Result<T, Error>`
//! - **Builder Pattern for Complex Types**: Configuration structs use builders
//! - **Immutable by Default**: A [`Document`] is never mutated once indexed
//!
//! ## Core Modules
//!
//! - [`models`] - Documents, links, headings and tasks
//! - [`error`] - Error types and Result alias
//! - [`config`] - Index configuration
//! - [`profiles`] - Configuration profiles for different environments
//! - [`utils`] - Serialization and path helpers
//!
//! ## Usage Examples
//!
//! ```
//! use notegraph_core::prelude::*;
//!
//! let doc = Document::new("Note A", "Note A.md")
//!     .with_link(LinkRef::wikilink("Note B", 3))
//!     .with_frontmatter_tags(["project"]);
//!
//! assert_eq!(doc.key(), "note a");
//! assert!(doc.has_tag("#Project"));
//! ```
//!
//! ### Error Handling
//!
//! ```
//! use notegraph_core::prelude::*;
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(Error::not_found(name))
//! }
//! assert!(lookup("Ghost").is_err());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod profiles;
pub mod utils;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;
pub use profiles::ConfigProfile;
pub use utils::{normalize_folder, path_in_folder, relative_slash_path, to_json_string};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::IndexConfig;
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Document, Heading, LinkKind, LinkRef, TaskItem, normalize_key, normalize_tag,
    };
    pub use crate::profiles::ConfigProfile;
}
