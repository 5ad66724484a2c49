//! # Vault
//!
//! Loads notes from disk and owns the live link index.
//!
//! This crate provides:
//! - [`DocumentStore`]: scans a vault directory and parses every note
//! - [`VaultIndex`]: holds the current [`GraphIndex`] snapshot and swaps in a
//!   new one on rebuild
//! - [`VaultWatcher`]: file system events for note files
//!
//! ## Quick Start
//!
//! ```no_run
//! use notegraph_vault::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = IndexConfig::builder("/path/to/vault").build()?;
//!     let vault = VaultIndex::open(&config).await?;
//!
//!     let index = vault.snapshot().await;
//!     println!("{} notes, {} links", index.len(), index.edge_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Snapshots
//!
//! [`VaultIndex::snapshot`] hands out an `Arc<GraphIndex>`. A rebuild builds
//! a whole new index and replaces the `Arc`; snapshots already handed out
//! keep answering from the index they were taken from.
//!
//! ```no_run
//! use notegraph_vault::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(config: IndexConfig) -> Result<()> {
//! let vault = Arc::new(VaultIndex::open(&config).await?);
//! let task = Arc::clone(&vault).watch(WatcherConfig::from(&config))?;
//! // ... queries keep calling vault.snapshot()
//! task.abort();
//! # Ok(())
//! # }
//! ```

pub mod index;
pub mod store;
pub mod watcher;

pub use index::{RebuildSummary, VaultIndex};
pub use notegraph_graph::GraphIndex;
pub use store::{DocumentStore, StoreConfig};
pub use watcher::{VaultEvent, VaultWatcher, WatcherConfig, next_batch};

pub mod prelude {
    pub use crate::index::{RebuildSummary, VaultIndex};
    pub use crate::store::{DocumentStore, StoreConfig};
    pub use crate::watcher::{VaultEvent, VaultWatcher, WatcherConfig};
    pub use notegraph_core::prelude::*;
    pub use notegraph_graph::GraphIndex;
}
