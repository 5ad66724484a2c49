//! # NoteGraph Tools
//!
//! Query operations over a [`GraphIndex`](notegraph_graph::GraphIndex) and a
//! name-based router that exposes them to JSON callers.
//!
//! ## Modules
//!
//! ### Filter and paging
//!
//! [`filter`] - [`FilterSpec`] is what a caller sends; [`CompiledFilter`] is
//! built once per query and applied to every candidate:
//! - Folder scope and excluded folders
//! - Exclude-name regex (an invalid pattern matches nothing)
//! - Tag include / exclude
//! - Modification date window
//!
//! Every list result is a [`Page`] `{total, offset, limit, results}`.
//!
//! ### Search
//!
//! [`search`] - line search in three modes, tag lookup, tag census and
//! Levenshtein name similarity.
//!
//! ### Queries
//!
//! [`queries::QueryTools`] - one method per operation, bound to a single
//! index snapshot. A name that does not resolve yields
//! [`Reply::Failed`], which serializes as `{"error": "..."}`.
//!
//! ### Router
//!
//! [`router::ToolRouter`] - `call(tool, arguments) -> value`, for the CLI and
//! the JSON-lines server.
//!
//! ## Example
//!
//! ```
//! use notegraph_core::{Document, LinkRef};
//! use notegraph_graph::GraphIndex;
//! use notegraph_tools::{RouterSettings, ToolRouter};
//! use serde_json::json;
//!
//! let index = GraphIndex::build(vec![
//!     Document::new("Inbox", "Inbox.md").with_link(LinkRef::wikilink("Projects", 3)),
//!     Document::new("Projects", "Projects.md"),
//! ]);
//!
//! let router = ToolRouter::new(&index, RouterSettings::default());
//! let reply = router.call("backlinks", json!({ "name": "projects" }));
//! assert_eq!(reply["total"], 1);
//! assert_eq!(reply["results"][0]["name"], "Inbox");
//! ```

pub mod filter;
pub mod queries;
pub mod router;
pub mod search;

pub use filter::{CompiledFilter, FilterSpec, Page, PageRequest, parse_date_bound};
pub use queries::{
    BacklinkEntry, Backlinks, BatchError, BatchResolve, BatchResults, ForwardLink, ForwardLinks,
    IndexStats, MissingNote, NoteView, QueryTools, Reply, ResolvedNote,
};
pub use router::{RouterSettings, TOOL_NAMES, ToolRouter};
pub use search::{
    ContentMatch, NAME_MATCH_MARKER, NoteSummary, SearchMode, SimilarName, TagCount, levenshtein,
    list_tags, notes_with_tag, search_content, similar_names, untagged_notes,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::filter::{CompiledFilter, FilterSpec, Page, PageRequest};
    pub use crate::queries::{QueryTools, Reply};
    pub use crate::router::{RouterSettings, ToolRouter};
    pub use crate::search::SearchMode;
    pub use notegraph_core::prelude::*;
    pub use notegraph_graph::{GraphIndex, TraversalRequest};
}
