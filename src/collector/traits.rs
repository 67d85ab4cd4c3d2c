//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the probes read the real `/proc` and `/sys`
//! trees on Linux and an in-memory tree under test.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Lists entries of `dir` whose file name starts with `prefix`, sorted
    /// by path so iteration order is stable across ticks.
    fn read_dir_prefixed(&self, dir: &Path, prefix: &str) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = self
            .read_dir(dir)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix))
            })
            .collect();
        entries.sort();
        entries
    }
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_real_fs_read_to_string() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        let content = fs.read_to_string(&cargo_toml).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn test_real_fs_exists() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        assert!(fs.exists(&cargo_toml));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_read_dir_prefixed_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["thermal_zone1", "thermal_zone0", "cooling_device0"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let fs = RealFs::new();
        let zones = fs.read_dir_prefixed(dir.path(), "thermal_zone");
        let names: Vec<_> = zones
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["thermal_zone0", "thermal_zone1"]);
    }

    #[test]
    fn test_read_dir_prefixed_missing_dir_is_empty() {
        let fs = RealFs::new();
        assert!(
            fs.read_dir_prefixed(Path::new("/nonexistent/12345"), "x")
                .is_empty()
        );
    }
}
