//! In-memory mock filesystem for testing probes without a real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can keep a handle and rewrite
/// counters between sampler ticks.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    inner: Arc<RwLock<Tree>>,
}

#[derive(Debug, Default)]
struct Tree {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl Tree {
    fn add_dir_chain(&mut self, path: &Path) {
        let mut current = Some(path);
        while let Some(p) = current {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            current = p.parent();
        }
    }
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file. Parent directories are created.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref();
        let Ok(mut tree) = self.inner.write() else {
            return;
        };
        if let Some(parent) = path.parent() {
            tree.add_dir_chain(parent);
        }
        tree.files.insert(path.to_path_buf(), content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        if let Ok(mut tree) = self.inner.write() {
            tree.add_dir_chain(path.as_ref());
        }
    }

    /// Removes a file or a whole directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Ok(mut tree) = self.inner.write() {
            tree.files.retain(|p, _| !p.starts_with(path));
            tree.directories.retain(|p| !p.starts_with(path));
        }
    }

    /// Adds a process with the files the sampler reads from `/proc/[pid]/`.
    ///
    /// `fds` empty entries are created under `fd/`. An empty `io` string
    /// leaves `io` absent, as for processes owned by other users.
    pub fn add_process(
        &self,
        pid: u32,
        stat: &str,
        cmdline: &str,
        io: &str,
        cgroup: &str,
        fds: usize,
    ) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("cmdline"), cmdline);
        if !io.is_empty() {
            self.add_file(base.join("io"), io);
        }
        if !cgroup.is_empty() {
            self.add_file(base.join("cgroup"), cgroup);
        }
        self.set_fd_count(pid, fds);
    }

    /// Replaces the contents of `/proc/[pid]/fd` with `count` entries.
    pub fn set_fd_count(&self, pid: u32, count: usize) {
        let fd_dir = PathBuf::from(format!("/proc/{}/fd", pid));
        self.remove(&fd_dir);
        self.add_dir(&fd_dir);
        for fd in 0..count {
            self.add_file(fd_dir.join(fd.to_string()), "");
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let tree = self
            .inner
            .read()
            .map_err(|_| io::Error::other("mock filesystem lock poisoned"))?;
        tree.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|t| t.files.contains_key(path) || t.directories.contains(path))
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let tree = self
            .inner
            .read()
            .map_err(|_| io::Error::other("mock filesystem lock poisoned"))?;
        if !tree.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();
        for file_path in tree.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }
        for dir_path in &tree.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 16384 kB\n");

        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/meminfo")).unwrap();
        assert_eq!(content, "MemTotal: 16384 kB\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let fs = MockFs::new();
        fs.add_file("/proc/1/stat", "stat content");
        fs.add_file("/proc/1/cmdline", "init");
        fs.add_file("/proc/2/stat", "stat content 2");

        let proc_entries = fs.read_dir(Path::new("/proc")).unwrap();
        assert_eq!(proc_entries.len(), 2);

        let proc1_entries = fs.read_dir(Path::new("/proc/1")).unwrap();
        assert_eq!(proc1_entries.len(), 2);
    }

    #[test]
    fn test_mock_fs_clones_share_tree() {
        let fs = MockFs::new();
        let handle = fs.clone();
        handle.add_file("/proc/loadavg", "0.1 0.2 0.3 1/100 42\n");
        assert!(fs.exists(Path::new("/proc/loadavg")));
    }

    #[test]
    fn test_mock_fs_fd_count_replaced() {
        let fs = MockFs::new();
        fs.add_process(7, "stat", "cmd", "", "", 5);
        assert_eq!(fs.read_dir(Path::new("/proc/7/fd")).unwrap().len(), 5);
        fs.set_fd_count(7, 2);
        assert_eq!(fs.read_dir(Path::new("/proc/7/fd")).unwrap().len(), 2);
        assert!(!fs.exists(Path::new("/proc/7/io")));
    }

    #[test]
    fn test_mock_fs_remove_subtree() {
        let fs = MockFs::new();
        fs.add_process(9, "stat", "cmd", "io", "0::/", 1);
        fs.remove("/proc/9");
        assert!(!fs.exists(Path::new("/proc/9")));
        assert!(!fs.exists(Path::new("/proc/9/stat")));
        assert!(fs.exists(Path::new("/proc")));
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
