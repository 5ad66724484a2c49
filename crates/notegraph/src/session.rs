//! A loaded vault answering tool calls, one JSON request per line

use notegraph_core::prelude::*;
use notegraph_tools::{RouterSettings, TOOL_NAMES, ToolRouter};
use notegraph_vault::{VaultIndex, WatcherConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

/// Tool answered by the session itself rather than the router
pub const REBUILD_TOOL: &str = "rebuild";

/// One line of input to [`Session::serve`]
#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

/// A vault index plus the router settings derived from its config
#[derive(Clone)]
pub struct Session {
    index: Arc<VaultIndex>,
    settings: RouterSettings,
    watcher: WatcherConfig,
}

impl Session {
    /// Validate the config, load the vault and build the first index
    pub async fn open(config: &IndexConfig) -> Result<Self> {
        let index = VaultIndex::open(config).await?;
        let stats = index.snapshot().await.stats();
        log::info!(
            "Indexed {} notes from {} ({} links, {} missing targets)",
            stats.total_documents,
            config.vault_path.display(),
            stats.total_edges,
            stats.broken_targets
        );
        Ok(Self {
            index: Arc::new(index),
            settings: RouterSettings::from(config),
            watcher: WatcherConfig::from(config),
        })
    }

    pub fn index(&self) -> &Arc<VaultIndex> {
        &self.index
    }

    pub fn settings(&self) -> RouterSettings {
        self.settings
    }

    /// Names accepted by [`Session::call`]
    pub fn tool_names() -> Vec<&'static str> {
        TOOL_NAMES
            .iter()
            .copied()
            .chain(std::iter::once(REBUILD_TOOL))
            .collect()
    }

    /// Run one tool against the current snapshot
    #[tracing::instrument(skip(self, arguments))]
    pub async fn call(&self, tool: &str, arguments: Value) -> Value {
        if tool == REBUILD_TOOL {
            return match self.index.rebuild().await {
                Ok(summary) => serde_json::to_value(summary)
                    .unwrap_or_else(|e| json!({ "error": e.to_string() })),
                Err(e) => json!({ "error": e.to_string() }),
            };
        }

        let snapshot = self.index.snapshot().await;
        ToolRouter::new(&snapshot, self.settings).call(tool, arguments)
    }

    /// Answer each input line with one output line until EOF.
    ///
    /// Blank lines are skipped; a line that is not a valid request gets an
    /// `{"error": ...}` reply and the loop continues.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut answered = 0;

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply = match serde_json::from_str::<ToolRequest>(line) {
                Ok(request) => {
                    log::debug!("Request: {}", request.tool);
                    self.call(&request.tool, request.arguments).await
                }
                Err(e) => json!({ "error": format!("Invalid request: {}", e) }),
            };

            let mut out = serde_json::to_vec(&reply)
                .map_err(|e| Error::other(format!("Failed to encode reply: {}", e)))?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
            answered += 1;
        }

        log::info!("Input closed after {} requests", answered);
        Ok(answered)
    }

    /// Rebuild in the background whenever the vault changes
    pub fn watch(&self) -> Result<JoinHandle<()>> {
        log::info!(
            "Watching {} (debounce {}ms)",
            self.index.store().root().display(),
            self.watcher.debounce_ms
        );
        Arc::clone(&self.index).watch(self.watcher.clone())
    }
}
