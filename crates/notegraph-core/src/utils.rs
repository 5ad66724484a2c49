//! Shared utilities for operations across notegraph crates.
//!
//! Provides DRY helpers for:
//! - Serialization with consistent error handling
//! - Store-relative path rendering
//! - Folder prefix matching

use crate::{Error, Result};
use std::path::{Component, Path};

/// Generic JSON serialization with consistent error handling
/// Works with any type that implements Serialize (including slices)
pub fn to_json_string<T: serde::Serialize + ?Sized>(data: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| Error::other(format!("Failed to serialize {} as JSON: {}", context, e)))
}

/// Render `path` relative to `root` with `/` separators.
///
/// Rejects paths outside `root` and paths that climb with `..`.
pub fn relative_slash_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::path_traversal(path))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    Error::invalid_path(format!("Non UTF-8 path: {}", path.display()))
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::path_traversal(path));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::invalid_path(format!(
            "Path is the store root: {}",
            path.display()
        )));
    }

    Ok(parts.join("/"))
}

/// Folder prefix in canonical form: surrounding `/` and a leading `./` removed
pub fn normalize_folder(folder: &str) -> &str {
    let folder = folder.trim();
    folder
        .strip_prefix("./")
        .unwrap_or(folder)
        .trim_matches('/')
}

/// True when a `/`-separated `path` lies under `folder` (an empty folder contains nothing)
pub fn path_in_folder(path: &str, folder: &str) -> bool {
    let folder = normalize_folder(folder);
    !folder.is_empty()
        && path.len() > folder.len()
        && path.starts_with(folder)
        && path.as_bytes()[folder.len()] == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_to_json_string() {
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };
        let json = to_json_string(&data, "test_data").unwrap();
        assert!(json.contains("test"));
        assert!(json.contains("42"));
    }

    #[test]
    fn test_relative_slash_path() {
        let root = PathBuf::from("/vault");
        let path = root.join("Projects").join("Alpha.md");
        assert_eq!(
            relative_slash_path(&root, &path).unwrap(),
            "Projects/Alpha.md"
        );
    }

    #[test]
    fn test_relative_path_outside_root() {
        let root = PathBuf::from("/vault");
        let result = relative_slash_path(&root, Path::new("/etc/passwd"));
        assert!(matches!(result, Err(Error::PathTraversal { .. })));
    }

    #[test]
    fn test_relative_path_parent_component() {
        let root = PathBuf::from("/vault");
        let result = relative_slash_path(&root, Path::new("/vault/../etc/passwd"));
        assert!(result.is_err());
    }

    #[test]
    fn test_path_in_folder() {
        assert!(path_in_folder("Projects/Alpha.md", "Projects"));
        assert!(path_in_folder("Projects/Sub/Alpha.md", "./Projects/"));
        assert!(!path_in_folder("ProjectsOld/Alpha.md", "Projects"));
        assert!(!path_in_folder("Alpha.md", ""));
        assert!(!path_in_folder("Projects", "Projects"));
    }
}
