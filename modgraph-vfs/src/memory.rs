//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// An in-memory file system implementation.
///
/// Files are stored in a `BTreeMap` keyed by normalized path. Directories
/// are implicit: a path is a directory when at least one stored file lies
/// beneath it.
///
/// # Example
/// ```
/// use modgraph_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.write_file(Path::new("/lib/api/Api.class"), b"").unwrap();
/// assert!(fs.is_dir(Path::new("/lib/api")));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        if let Ok(mut map) = fs.files.write() {
            for (path, content) in files {
                map.insert(normalize(Path::new(path.as_ref())), content);
            }
        }
        fs
    }

    fn lock_poisoned() -> VfsError {
        VfsError::Custom {
            message: String::from("Lock poisoned"),
        }
    }
}

/// Normalize a path for internal storage.
///
/// Uses forward slashes and drops trailing separators, so `/a/b/` and
/// `/a\b` address the same entry.
fn normalize(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() && text.starts_with('/') {
        String::from("/")
    } else {
        trimmed.to_string()
    }
}

/// Prefix every descendant of `dir` starts with
fn dir_prefix(dir: &str) -> String {
    if dir == "/" {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize(path);
        let files = self.files.read().map_err(|_| Self::lock_poisoned())?;

        files
            .get(&normalized)
            .cloned()
            .ok_or(VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut files = self.files.write().map_err(|_| Self::lock_poisoned())?;
        files.insert(normalized, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        match self.files.read() {
            Ok(files) => files.contains_key(&normalized),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let prefix = dir_prefix(&normalize(path));
        match self.files.read() {
            Ok(files) => files
                .range(prefix.clone()..)
                .next()
                .is_some_and(|(key, _)| key.starts_with(&prefix)),
            Err(_) => false,
        }
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>> {
        let normalized = normalize(path);
        let prefix = dir_prefix(&normalized);
        let files = self.files.read().map_err(|_| Self::lock_poisoned())?;

        let mut children = BTreeSet::new();
        for key in files.keys().skip_while(|k| k.as_str() < prefix.as_str()) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            let child = rest.split('/').next().unwrap_or(rest);
            if !child.is_empty() {
                children.insert(format!("{prefix}{child}"));
            }
        }

        if children.is_empty() {
            return if files.contains_key(&normalized) {
                Err(VfsError::NotADirectory { path: normalized })
            } else {
                Err(VfsError::NotFound { path: normalized })
            };
        }

        Ok(children.into_iter().map(PathBuf::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn fixture() -> MemoryFileSystem {
        MemoryFileSystem::with_files([
            ("/mp/b-1.0.jar", b"jar".to_vec()),
            ("/mp/a/module-info.java", b"module a {}".to_vec()),
            ("/mp/a/p/A.class", Vec::new()),
            ("/mp/a/p/q/B.class", Vec::new()),
            ("/mpx/c.jar", Vec::new()),
        ])
    }

    #[test]
    fn test_new_fs_is_empty() {
        let fs = MemoryFileSystem::new();
        assert!(!fs.exists(Path::new("/anything.txt")));
        assert!(!fs.is_dir(Path::new("/")));
    }

    #[test]
    fn test_write_and_read() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/test.txt");

        fs.write_file(path, b"hello world").unwrap();
        assert_eq!(fs.read_file(path).unwrap(), b"hello world");
    }

    #[test]
    fn test_read_nonexistent() {
        let fs = MemoryFileSystem::new();
        let result = fs.read_file(Path::new("/nonexistent.txt"));
        assert!(matches!(result.unwrap_err(), VfsError::NotFound { .. }));
    }

    #[test]
    fn test_implicit_directories() {
        let fs = fixture();
        assert!(fs.is_dir(Path::new("/")));
        assert!(fs.is_dir(Path::new("/mp")));
        assert!(fs.is_dir(Path::new("/mp/a/p")));
        assert!(!fs.is_dir(Path::new("/mp/b-1.0.jar")));
        assert!(fs.is_file(Path::new("/mp/b-1.0.jar")));
        assert!(fs.exists(Path::new("/mp/a")));
        assert!(!fs.is_file(Path::new("/mp/a")));
    }

    #[test]
    fn test_sibling_prefix_is_not_child() {
        let fs = fixture();
        // "/mpx" shares the "/mp" prefix but is not inside it
        let children = fs.read_dir(Path::new("/mp")).unwrap();
        assert!(!children.contains(&PathBuf::from("/mpx/c.jar")));
    }

    #[test]
    fn test_read_dir_sorted_children() {
        let fs = fixture();
        let children = fs.read_dir(Path::new("/mp")).unwrap();
        assert_eq!(
            children,
            vec![PathBuf::from("/mp/a"), PathBuf::from("/mp/b-1.0.jar")]
        );

        let nested = fs.read_dir(Path::new("/mp/a/p/")).unwrap();
        assert_eq!(
            nested,
            vec![PathBuf::from("/mp/a/p/A.class"), PathBuf::from("/mp/a/p/q")]
        );
    }

    #[test]
    fn test_read_dir_root() {
        let fs = fixture();
        let children = fs.read_dir(Path::new("/")).unwrap();
        assert_eq!(children, vec![PathBuf::from("/mp"), PathBuf::from("/mpx")]);
    }

    #[test]
    fn test_read_dir_errors() {
        let fs = fixture();
        assert!(matches!(
            fs.read_dir(Path::new("/mp/b-1.0.jar")).unwrap_err(),
            VfsError::NotADirectory { .. }
        ));
        assert!(matches!(
            fs.read_dir(Path::new("/missing")).unwrap_err(),
            VfsError::NotFound { .. }
        ));
    }

    #[test]
    fn test_backslash_paths_normalized() {
        let fs = MemoryFileSystem::new();
        fs.write_file(Path::new("\\lib\\a.jar"), b"x").unwrap();
        assert!(fs.is_file(Path::new("/lib/a.jar")));
    }

    #[test]
    fn test_clone_shares_data() {
        let fs1 = MemoryFileSystem::new();
        let path = Path::new("/shared.txt");
        fs1.write_file(path, b"shared").unwrap();

        let fs2 = fs1.clone();
        fs2.write_file(path, b"modified").unwrap();
        assert_eq!(fs1.read_file(path).unwrap(), b"modified");
    }

    #[test]
    fn test_concurrent_reads() {
        let fs = fixture();
        let mut handles = vec![];

        for _ in 0..8 {
            let fs_clone = fs.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let children = fs_clone.read_dir(Path::new("/mp")).unwrap();
                    assert_eq!(children.len(), 2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
