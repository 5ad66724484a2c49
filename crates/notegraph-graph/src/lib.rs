//! # Link Graph Index
//!
//! Immutable link graph over parsed notes, with name resolution and
//! breadth-first traversal.
//!
//! Provides:
//! - Forward and backward adjacency keyed by normalized note name
//! - Broken link bookkeeping (targets with no note)
//! - Exact and fuzzy name resolution
//! - Multi-root traversal with depth bound and folder exclusion
//! - Graph statistics
//!
//! ## Quick Start
//!
//! ```
//! use notegraph_graph::{GraphIndex, TraversalRequest};
//! use notegraph_core::prelude::*;
//!
//! let index = GraphIndex::build(vec![
//!     Document::new("Note A", "Note A.md").with_link(LinkRef::wikilink("Note B", 1)),
//!     Document::new("Note B", "Note B.md").with_link(LinkRef::wikilink("Ghost", 1)),
//! ]);
//!
//! assert!(index.backward("note b").unwrap().contains("note a"));
//! assert!(index.broken().contains_key("ghost"));
//!
//! let walk = index.traverse(&TraversalRequest::new(["NOTE A"], 2)).unwrap();
//! assert_eq!(walk.notes.len(), 2);
//! assert_eq!(walk.missing[0].target, "Ghost");
//! ```
//!
//! ## Core Concepts
//!
//! - **Key**: `lowercase(trim(name))`, used by every map
//! - **Forward links**: deduplicated targets of a note, existing or not
//! - **Backward links**: derived strictly from forward links
//! - **Broken links**: forward targets with no note
//!
//! ## Modules
//!
//! - [`graph`] - `GraphIndex` construction and accessors
//! - [`resolver`] - Exact and fuzzy name resolution
//! - [`traversal`] - Breadth-first traversal
//!
//! ## Performance Characteristics
//!
//! - Construction: O(n + m) where n = notes, m = link occurrences
//! - Exact resolution: O(1); fuzzy resolution: O(n)
//! - Traversal: O(reached notes + their link occurrences)

pub mod graph;
pub mod resolver;
pub mod traversal;

pub use graph::{GraphIndex, GraphStats};
pub use resolver::{MatchKind, Resolved, fuzzy_key};
pub use traversal::{MissingLink, Traversal, TraversalNode, TraversalRequest};

pub mod prelude {
    pub use crate::graph::{GraphIndex, GraphStats};
    pub use crate::resolver::{MatchKind, Resolved};
    pub use crate::traversal::{MissingLink, Traversal, TraversalNode, TraversalRequest};
    pub use notegraph_core::prelude::*;
}
