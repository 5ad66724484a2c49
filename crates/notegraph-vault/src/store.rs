//! Document store: scans a vault directory and parses every note

use chrono::{DateTime, Utc};
use notegraph_core::prelude::*;
use notegraph_core::relative_slash_path;
use notegraph_parser::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::{DirEntry, WalkDir};

/// What the store reads and what it skips
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root: PathBuf,
    /// Extensions including the dot, e.g. `.md`
    pub allowed_extensions: HashSet<String>,
    /// Directory or file names pruned at any depth
    pub excluded_names: HashSet<String>,
    pub max_file_size: u64,
    /// Keep notes whose frontmatter fails to parse
    pub lenient_frontmatter: bool,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from(&IndexConfig {
            vault_path: root.into(),
            ..IndexConfig::default()
        })
    }
}

impl From<&IndexConfig> for StoreConfig {
    fn from(config: &IndexConfig) -> Self {
        Self {
            root: config.vault_path.clone(),
            allowed_extensions: config.allowed_extensions.clone(),
            excluded_names: config.excluded_paths.clone(),
            max_file_size: config.max_file_size,
            lenient_frontmatter: true,
        }
    }
}

/// Reads documents from disk
#[derive(Debug, Clone)]
pub struct DocumentStore {
    config: StoreConfig,
    parser: Parser,
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        let parser = if config.lenient_frontmatter {
            Parser::new()
        } else {
            Parser::strict()
        };
        Self { config, parser }
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Load and parse every note under the root.
    ///
    /// Files are visited in path order. Unreadable, oversized and
    /// unparsable files are skipped with a warning; only a missing root
    /// fails the load.
    #[instrument(skip(self), fields(root = %self.config.root.display()), name = "store_load")]
    pub async fn load(&self) -> Result<Vec<Document>> {
        let files = self.scan_files()?;
        log::info!(
            "Found {} note files under {}",
            files.len(),
            self.config.root.display()
        );

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            if let Some(doc) = self.load_file(&path).await {
                documents.push(doc);
            }
        }

        log::info!("Loaded {} documents", documents.len());
        Ok(documents)
    }

    /// Read and parse one file, logging and returning `None` on failure
    async fn load_file(&self, path: &Path) -> Option<Document> {
        let rel_path = match relative_slash_path(&self.config.root, path) {
            Ok(rel) => rel,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Failed to stat {}: {}", rel_path, e);
                return None;
            }
        };

        if metadata.len() > self.config.max_file_size {
            log::warn!(
                "{}",
                Error::file_too_large(path, metadata.len(), self.config.max_file_size)
            );
            return None;
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read {}: {}", rel_path, e);
                return None;
            }
        };

        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        match self.parser.parse_document(&rel_path, &content, modified) {
            Ok(doc) => {
                log::debug!("Parsed {}: {} links", rel_path, doc.links.len());
                Some(doc)
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}", rel_path, e);
                None
            }
        }
    }

    /// Collect note paths, pruning excluded names and never following symlinks
    fn scan_files(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.root;
        if !root.is_dir() {
            return Err(Error::config_error(format!(
                "Vault path is not a directory: {}",
                root.display()
            )));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let allowed = entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.is_allowed(name));
            if allowed {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.config.excluded_names.contains(name))
    }

    fn is_allowed(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.config
            .allowed_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_load_documents() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "A.md", "Links to [[B]] #alpha");
        write(temp_dir.path(), "folder/B.md", "---\ntags: [beta]\n---\nBack to [[A]]");
        write(temp_dir.path(), "notes.txt", "not a note");

        let store = DocumentStore::new(StoreConfig::new(temp_dir.path()));
        let docs = store.load().await.unwrap();

        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["A.md", "folder/B.md"]);
        assert_eq!(docs[0].inline_tags, vec!["alpha"]);
        assert_eq!(docs[1].frontmatter_tags, vec!["beta"]);
        assert!(docs[1].modified > DateTime::<Utc>::default());
    }

    #[tokio::test]
    async fn test_excluded_directories_pruned() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "Keep.md", "");
        write(temp_dir.path(), ".obsidian/workspace.md", "");
        write(temp_dir.path(), "sub/.git/HEAD.md", "");
        write(temp_dir.path(), "node_modules/pkg/README.md", "");

        let store = DocumentStore::new(StoreConfig::new(temp_dir.path()));
        let docs = store.load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "Keep");
    }

    #[tokio::test]
    async fn test_oversized_file_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "Small.md", "ok");
        write(temp_dir.path(), "Big.md", &"x".repeat(2048));

        let mut config = StoreConfig::new(temp_dir.path());
        config.max_file_size = 1024;
        let docs = DocumentStore::new(config).load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "Small");
    }

    #[tokio::test]
    async fn test_invalid_utf8_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "Good.md", "fine");
        fs::write(temp_dir.path().join("Bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let docs = DocumentStore::new(StoreConfig::new(temp_dir.path()))
            .load()
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "Good");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write(outside.path(), "Secret.md", "hidden");
        write(temp_dir.path(), "Real.md", "");
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("Secret.md"),
            temp_dir.path().join("Alias.md"),
        )
        .unwrap();

        let docs = DocumentStore::new(StoreConfig::new(temp_dir.path()))
            .load()
            .await
            .unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Real"]);
    }

    #[tokio::test]
    async fn test_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(StoreConfig::new(temp_dir.path().join("nope")));
        assert!(store.load().await.is_err());
    }
}
