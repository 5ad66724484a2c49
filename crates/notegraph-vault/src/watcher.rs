//! File system watcher for vault changes.
//!
//! Forwards create, modify, delete and rename events for note files over an
//! async channel. [`next_batch`] groups bursts of events so a consumer can
//! rebuild once per burst.

use notify::event::{ModifyKind, RenameMode};
use notify::{
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher,
};
use notegraph_core::{Error, IndexConfig, Result};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// File system event types relevant to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    FileCreated(PathBuf),
    FileModified(PathBuf),
    FileDeleted(PathBuf),
    /// (from, to)
    FileRenamed(PathBuf, PathBuf),
}

impl VaultEvent {
    /// Primary path affected by this event
    pub fn path(&self) -> &Path {
        match self {
            Self::FileCreated(p)
            | Self::FileModified(p)
            | Self::FileDeleted(p)
            | Self::FileRenamed(_, p) => p,
        }
    }

    /// Every path touched by the event
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Self::FileRenamed(from, to) => vec![from.as_path(), to.as_path()],
            _ => vec![self.path()],
        }
    }

    /// Check if event is for a markdown file
    pub fn is_markdown(&self) -> bool {
        self.paths().iter().any(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
    }
}

/// Configuration for the file watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub recursive: bool,
    /// Only report events for markdown files
    pub markdown_only: bool,
    /// Ignore hidden files (starting with .)
    pub ignore_hidden: bool,
    /// Path components that silence an event (`.git`, `.obsidian`, ...)
    pub excluded_names: HashSet<String>,
    /// Quiet period that closes a batch
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            markdown_only: true,
            ignore_hidden: true,
            excluded_names: HashSet::new(),
            debounce_ms: 250,
        }
    }
}

impl From<&IndexConfig> for WatcherConfig {
    fn from(config: &IndexConfig) -> Self {
        Self {
            excluded_names: config.excluded_paths.clone(),
            debounce_ms: config.watch_debounce_ms,
            ..Self::default()
        }
    }
}

/// Watches a vault directory for file system changes
pub struct VaultWatcher {
    config: WatcherConfig,
    watch_path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    event_tx: UnboundedSender<VaultEvent>,
}

impl VaultWatcher {
    /// Create a watcher and the receiving end of its event channel
    pub fn new(
        path: impl Into<PathBuf>,
        config: WatcherConfig,
    ) -> (Self, UnboundedReceiver<VaultEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            config,
            watch_path: path.into(),
            watcher: None,
            event_tx,
        };
        (watcher, event_rx)
    }

    /// Start watching the vault directory
    pub fn start(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Err(Error::other("Watcher already started"));
        }

        let event_tx = self.event_tx.clone();
        let config = self.config.clone();
        let root = self.watch_path.clone();

        let mut notify_watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for vault_event in convert_event(event) {
                        if should_emit_event(&vault_event, &root, &config) {
                            // Receiver may be gone during shutdown
                            let _ = event_tx.send(vault_event);
                        }
                    }
                }
                Err(e) => log::warn!("Watch error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| Error::io(std::io::Error::other(e)))?;

        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        notify_watcher
            .watch(&self.watch_path, mode)
            .map_err(|e| Error::io(std::io::Error::other(e)))?;

        log::info!("Watching {}", self.watch_path.display());
        self.watcher = Some(notify_watcher);
        Ok(())
    }

    /// Stop watching; dropping the notify watcher unregisters it
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            log::info!("Stopped watching {}", self.watch_path.display());
        }
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }
}

/// Wait for the next event, then keep collecting until `debounce` passes
/// with no new event. Returns `None` once the channel is closed.
pub async fn next_batch(
    rx: &mut UnboundedReceiver<VaultEvent>,
    debounce: Duration,
) -> Option<Vec<VaultEvent>> {
    let first = rx.recv().await?;
    let mut batch = vec![first];

    loop {
        match tokio::time::timeout(debounce, rx.recv()).await {
            Ok(Some(event)) => batch.push(event),
            // Channel closed mid-batch: deliver what we have
            Ok(None) | Err(_) => break,
        }
    }

    Some(batch)
}

fn convert_event(event: Event) -> Vec<VaultEvent> {
    match event.kind {
        EventKind::Create(_) => event.paths.into_iter().map(VaultEvent::FileCreated).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            let mut paths = event.paths.into_iter();
            match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => vec![VaultEvent::FileRenamed(from, to)],
                _ => Vec::new(),
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.into_iter().map(VaultEvent::FileDeleted).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.into_iter().map(VaultEvent::FileCreated).collect()
        }
        // Generic events are treated as modifications
        EventKind::Modify(_) | EventKind::Any => {
            event.paths.into_iter().map(VaultEvent::FileModified).collect()
        }
        EventKind::Remove(_) => event.paths.into_iter().map(VaultEvent::FileDeleted).collect(),
        _ => Vec::new(),
    }
}

fn should_emit_event(event: &VaultEvent, root: &Path, config: &WatcherConfig) -> bool {
    let path = event.path();

    if config.ignore_hidden
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'))
    {
        return false;
    }

    let relative = path.strip_prefix(root).unwrap_or(path);
    let excluded = relative.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| config.excluded_names.contains(name)),
        _ => false,
    });
    if excluded {
        return false;
    }

    !config.markdown_only || event.is_markdown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::sleep;

    fn excluding(names: &[&str]) -> WatcherConfig {
        WatcherConfig {
            excluded_names: names.iter().map(|n| n.to_string()).collect(),
            ..WatcherConfig::default()
        }
    }

    #[test]
    fn test_convert_rename_event() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/v/old.md"))
            .add_path(PathBuf::from("/v/new.md"));
        assert_eq!(
            convert_event(event),
            vec![VaultEvent::FileRenamed(
                PathBuf::from("/v/old.md"),
                PathBuf::from("/v/new.md")
            )]
        );
    }

    #[test]
    fn test_access_events_ignored() {
        let event = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/v/a.md"));
        assert!(convert_event(event).is_empty());
    }

    #[test]
    fn test_filtering() {
        let root = Path::new("/v");
        let config = excluding(&[".obsidian"]);
        let emit = |path: &str| {
            should_emit_event(&VaultEvent::FileModified(PathBuf::from(path)), root, &config)
        };

        assert!(emit("/v/notes/a.md"));
        assert!(!emit("/v/notes/a.txt"));
        assert!(!emit("/v/.hidden.md"));
        assert!(!emit("/v/.obsidian/workspace.md"));
    }

    #[test]
    fn test_rename_out_of_markdown_still_reported() {
        let event = VaultEvent::FileRenamed(PathBuf::from("/v/a.md"), PathBuf::from("/v/a.txt"));
        assert!(event.is_markdown());
        assert_eq!(event.paths().len(), 2);
    }

    #[tokio::test]
    async fn test_next_batch_debounces() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(VaultEvent::FileCreated(PathBuf::from("a.md"))).unwrap();
        tx.send(VaultEvent::FileModified(PathBuf::from("a.md"))).unwrap();

        let batch = next_batch(&mut rx, Duration::from_millis(20)).await.unwrap();
        assert_eq!(batch.len(), 2);

        drop(tx);
        assert!(next_batch(&mut rx, Duration::from_millis(20)).await.is_none());
    }

    #[tokio::test]
    async fn test_watcher_start_stop() {
        let temp_dir = TempDir::new().unwrap();
        let (mut watcher, _rx) = VaultWatcher::new(temp_dir.path(), WatcherConfig::default());

        assert!(!watcher.is_running());
        watcher.start().unwrap();
        assert!(watcher.is_running());
        assert!(watcher.start().is_err());

        watcher.stop();
        assert!(!watcher.is_running());
    }

    #[tokio::test]
    async fn test_file_created_event() {
        let temp_dir = TempDir::new().unwrap();
        let (mut watcher, mut rx) = VaultWatcher::new(temp_dir.path(), WatcherConfig::default());
        watcher.start().unwrap();
        sleep(Duration::from_millis(200)).await;

        let file_path = temp_dir.path().join("test.md");
        fs::write(&file_path, "# Test").unwrap();
        sleep(Duration::from_millis(500)).await;

        let expected = file_path.canonicalize().ok();
        let mut found = false;
        while let Ok(event) = rx.try_recv() {
            // macOS reports /private/var for /var
            if event.path().canonicalize().ok() == expected {
                found = true;
                break;
            }
        }
        assert!(found, "Did not receive an event for the new note");

        watcher.stop();
    }

    #[tokio::test]
    async fn test_ignores_non_markdown_files() {
        let temp_dir = TempDir::new().unwrap();
        let (mut watcher, mut rx) = VaultWatcher::new(temp_dir.path(), WatcherConfig::default());
        watcher.start().unwrap();
        sleep(Duration::from_millis(100)).await;

        fs::write(temp_dir.path().join("test.txt"), "Test").unwrap();
        sleep(Duration::from_millis(200)).await;

        assert!(rx.try_recv().is_err());
        watcher.stop();
    }
}
