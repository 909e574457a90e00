//! The file system seam used by artifact and module path scanning

use crate::error::VfsResult;
use std::path::{Path, PathBuf};

/// File access needed to scan module paths and read compilation units.
///
/// `MemoryFileSystem` backs fixtures and tests; `NativeFileSystem` backs the
/// command line tool.
pub trait VirtualFileSystem: Send + Sync {
    /// Whole contents of a file.
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Create or truncate `path` with `content`.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of a directory as full paths.
    ///
    /// The result is sorted lexicographically so that module path scanning
    /// visits entries in the same order on every run. Fails with
    /// `VfsError::NotFound` for a missing path and `VfsError::NotADirectory`
    /// for a file.
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>>;
}
