//! Long-lived owner of the current [`GraphIndex`] snapshot

use crate::store::{DocumentStore, StoreConfig};
use crate::watcher::{VaultWatcher, WatcherConfig, next_batch};
use notegraph_core::prelude::*;
use notegraph_graph::GraphIndex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::instrument;

/// Outcome of one rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub generation: u64,
    pub documents: usize,
    pub edges: usize,
    pub broken_targets: usize,
    pub elapsed_ms: u64,
}

/// Owns the live index and replaces it wholesale on rebuild.
///
/// Readers take an `Arc` snapshot and keep it for the whole query, so a
/// concurrent rebuild never changes what they see. Rebuilds are serialized
/// and do their loading and building outside the write lock.
pub struct VaultIndex {
    store: DocumentStore,
    current: RwLock<Arc<GraphIndex>>,
    rebuild_lock: Mutex<()>,
    generation: AtomicU64,
}

impl VaultIndex {
    /// Create with an empty snapshot; call [`VaultIndex::rebuild`] to load
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(GraphIndex::default())),
            rebuild_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Create from config and perform the initial load
    pub async fn open(config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        let index = Self::new(DocumentStore::new(StoreConfig::from(config)));
        index.rebuild().await?;
        Ok(index)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Arc<GraphIndex> {
        Arc::clone(&*self.current.read().await)
    }

    /// Number of completed rebuilds
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Reload every document and swap in a freshly built index.
    ///
    /// On a load error the previous snapshot stays in place.
    #[instrument(skip(self), name = "vault_rebuild")]
    pub async fn rebuild(&self) -> Result<RebuildSummary> {
        let _guard = self.rebuild_lock.lock().await;
        let started = Instant::now();

        let documents = self.store.load().await?;
        let index = GraphIndex::build(documents);
        let stats = index.stats();

        *self.current.write().await = Arc::new(index);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let summary = RebuildSummary {
            generation,
            documents: stats.total_documents,
            edges: stats.total_edges,
            broken_targets: stats.broken_targets,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        log::info!(
            "Rebuild {} complete: {} documents, {} edges in {}ms",
            summary.generation,
            summary.documents,
            summary.edges,
            summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Watch the store root and rebuild once per debounced batch of changes.
    ///
    /// The returned task owns the watcher; aborting it stops watching.
    pub fn watch(self: Arc<Self>, config: WatcherConfig) -> Result<JoinHandle<()>> {
        let debounce = Duration::from_millis(config.debounce_ms);
        let (mut watcher, mut rx) = VaultWatcher::new(self.store.root(), config);
        watcher.start()?;

        Ok(tokio::spawn(async move {
            let _watcher = watcher;
            while let Some(batch) = next_batch(&mut rx, debounce).await {
                log::debug!("{} file events, rebuilding", batch.len());
                if let Err(e) = self.rebuild().await {
                    log::error!("Rebuild after file change failed: {}", e);
                }
            }
        }))
    }
}
