//! Discover router definition files in a directory.

use crate::config::{validate, RouterSpec};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Whether a directory entry is a router definition: `*.json`, not `_`-prefixed.
fn is_router_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('_') && path.extension().is_some_and(|ext| ext == "json") && path.is_file()
}

/// Read and validate every router definition in `dir`, in directory-listing order.
///
/// Fails if `dir` is not a directory or any definition is unreadable or invalid.
pub fn load_router_specs(dir: &Path) -> Result<Vec<(PathBuf, RouterSpec)>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::NotADirectory(dir.to_path_buf()));
    }
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ConfigError::Io { path, source }
    };
    let mut specs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if !is_router_file(&path) {
            tracing::debug!(path = %path.display(), "skipping");
            continue;
        }
        let raw = std::fs::read_to_string(&path).map_err(io_err(&path))?;
        let spec: RouterSpec = serde_json::from_str(&raw).map_err(|source| ConfigError::RouterFile {
            path: path.clone(),
            source,
        })?;
        validate(&spec)?;
        specs.push((path, spec));
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_router_specs(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)));
    }

    #[test]
    fn skips_underscore_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("books.json"), r#"{"model": "books", "tags": ["books"]}"#).unwrap();
        fs::write(dir.path().join("_draft.json"), r#"{"model": "drafts"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a router").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let specs = load_router_specs(dir.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].1.model, "books");
        assert_eq!(specs[0].1.tags, vec!["books".to_string()]);
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ model: ").unwrap();
        match load_router_specs(dir.path()).unwrap_err() {
            ConfigError::RouterFile { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.json"), r#"{"model": "x", "router": true}"#).unwrap();
        assert!(load_router_specs(dir.path()).is_err());
    }
}
