//! # NoteGraph
//!
//! Command-line front end for the NoteGraph index: configuration loading,
//! logging setup, and a [`Session`] that answers tool calls over a loaded
//! vault, either one at a time or as a JSON-lines stream.
//!
//! ```no_run
//! use notegraph::{ConfigSources, Session};
//! use serde_json::json;
//!
//! # async fn demo() -> notegraph::Result<()> {
//! let config = ConfigSources::new().vault("~/notes").load()?;
//! let session = Session::open(&config).await?;
//! let orphans = session.call("orphans", json!({ "limit": 10 })).await;
//! println!("{}", orphans);
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod session;
pub mod settings;

pub use logging::{LogFormat, init_logging};
pub use notegraph_core::prelude::*;
pub use notegraph_graph::{GraphIndex, TraversalRequest};
pub use notegraph_tools::{RouterSettings, TOOL_NAMES, ToolRouter};
pub use notegraph_vault::{RebuildSummary, VaultIndex};
pub use session::{REBUILD_TOOL, Session, ToolRequest};
pub use settings::{ConfigSources, ENV_PREFIX, expand_path, load_config};
