//! 制品扫描
//!
//! 制品是模块路径、系统路径或类路径上的一个条目：目录或 `.jar` 归档。
//! 扫描结果包含制品内的包集合与根目录下的文本描述符（如果有）。

pub mod archive;

use crate::error::ResolveError;
use crate::syntax::is_identifier;
use archive::ArchiveReader;
use modgraph_vfs::VirtualFileSystem;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 文本模块描述符文件名
pub const DESCRIPTOR_SOURCE: &str = "module-info.java";
/// 编译后的模块描述符文件名
pub const DESCRIPTOR_CLASS: &str = "module-info.class";
const ARCHIVE_EXTENSION: &str = "jar";
const META_INF: &str = "META-INF";

/// 制品形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Directory,
    Archive,
}

/// 制品中的描述符源码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSource {
    /// 报告位置用的路径
    pub path: PathBuf,
    pub text: String,
}

/// 扫描后的制品
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub packages: BTreeSet<String>,
    pub descriptor: Option<DescriptorSource>,
}

impl Artifact {
    /// 扫描一个目录或归档
    pub fn open(vfs: &dyn VirtualFileSystem, path: &Path) -> Result<Self, ResolveError> {
        let artifact = if vfs.is_dir(path) {
            Self::open_directory(vfs, path)?
        } else {
            Self::open_archive(vfs, path)?
        };
        debug!(
            target: "modgraph::scan",
            artifact = %path.display(),
            packages = artifact.packages.len(),
            explicit = artifact.is_explicit(),
            "scanned artifact"
        );
        Ok(artifact)
    }

    fn open_directory(vfs: &dyn VirtualFileSystem, root: &Path) -> Result<Self, ResolveError> {
        let mut files = Vec::new();
        collect_files(vfs, root, root, &mut files)?;

        let packages = packages_of(files.iter().map(String::as_str));
        let source = root.join(DESCRIPTOR_SOURCE);
        let descriptor = if vfs.is_file(&source) {
            let bytes = vfs
                .read_file(&source)
                .map_err(|e| ResolveError::io(&source, e))?;
            Some(DescriptorSource {
                text: utf8(&source, bytes)?,
                path: source,
            })
        } else {
            None
        };
        reject_class_descriptor(root, &files, &descriptor)?;

        Ok(Self {
            path: root.to_path_buf(),
            kind: ArtifactKind::Directory,
            packages,
            descriptor,
        })
    }

    fn open_archive(vfs: &dyn VirtualFileSystem, path: &Path) -> Result<Self, ResolveError> {
        let bytes = vfs.read_file(path).map_err(|e| ResolveError::io(path, e))?;
        let malformed = |e: archive::ArchiveError| ResolveError::MalformedArchive {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let reader = ArchiveReader::from_bytes(bytes).map_err(malformed)?;

        let files: Vec<String> = reader
            .entries()
            .iter()
            .filter(|entry| !entry.is_dir())
            .map(|entry| entry.name.clone())
            .collect();
        let packages = packages_of(files.iter().map(String::as_str));

        let descriptor = if reader.contains(DESCRIPTOR_SOURCE) {
            let source = path.join(DESCRIPTOR_SOURCE);
            let bytes = reader.read(DESCRIPTOR_SOURCE).map_err(malformed)?;
            Some(DescriptorSource {
                text: utf8(&source, bytes)?,
                path: source,
            })
        } else {
            None
        };
        reject_class_descriptor(path, &files, &descriptor)?;

        Ok(Self {
            path: path.to_path_buf(),
            kind: ArtifactKind::Archive,
            packages,
            descriptor,
        })
    }

    /// 制品文件名（自动模块命名的输入）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// 是否带有模块描述符
    pub fn is_explicit(&self) -> bool {
        self.descriptor.is_some()
    }
}

/// 路径是否为归档
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// 条目名对应的包：`a/b/C.class` → `a.b`
///
/// 根目录下的类、`META-INF` 下的条目以及目录名不是合法标识符的条目不属于任何包。
pub fn package_of(entry: &str) -> Option<String> {
    let (dir, file) = entry.rsplit_once('/')?;
    if !file.ends_with(".class") || file == DESCRIPTOR_CLASS {
        return None;
    }
    let segments: Vec<&str> = dir.split('/').collect();
    if segments[0] == META_INF || !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }
    Some(segments.join("."))
}

fn packages_of<'a>(entries: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    entries.filter_map(package_of).collect()
}

/// 只有编译后的描述符而没有文本描述符时无法得知模块声明
fn reject_class_descriptor(
    path: &Path,
    files: &[String],
    descriptor: &Option<DescriptorSource>,
) -> Result<(), ResolveError> {
    if descriptor.is_none() && files.iter().any(|f| f == DESCRIPTOR_CLASS) {
        return Err(ResolveError::MalformedDescriptor {
            path: path.join(DESCRIPTOR_CLASS),
            message: format!("compiled descriptor without {DESCRIPTOR_SOURCE}"),
            location: None,
        });
    }
    Ok(())
}

/// 递归收集目录下的文件，返回以 `/` 分隔的相对路径
fn collect_files(
    vfs: &dyn VirtualFileSystem,
    root: &Path,
    dir: &Path,
    out: &mut Vec<String>,
) -> Result<(), ResolveError> {
    let children = vfs.read_dir(dir).map_err(|e| ResolveError::io(dir, e))?;
    for child in children {
        if vfs.is_dir(&child) {
            collect_files(vfs, root, &child, out)?;
        } else if let Ok(relative) = child.strip_prefix(root) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(parts.join("/"));
        }
    }
    Ok(())
}

fn utf8(path: &Path, bytes: Vec<u8>) -> Result<String, ResolveError> {
    String::from_utf8(bytes).map_err(|e| ResolveError::io(path, format!("invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::archive::ArchiveWriter;
    use super::*;
    use modgraph_vfs::MemoryFileSystem;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_package_of() {
        assert_eq!(package_of("api/Api.class").as_deref(), Some("api"));
        assert_eq!(package_of("a/b/C$Inner.class").as_deref(), Some("a.b"));
        assert_eq!(package_of("Root.class"), None);
        assert_eq!(package_of("META-INF/versions/9/p/A.class"), None);
        assert_eq!(package_of("p/readme.txt"), None);
        assert_eq!(package_of("my-dir/A.class"), None);
        assert_eq!(package_of(DESCRIPTOR_CLASS), None);
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive(Path::new("/mp/test-api-1.0.jar")));
        assert!(is_archive(Path::new("/mp/LIB.JAR")));
        assert!(!is_archive(Path::new("/mp/classes")));
    }

    #[test]
    fn test_open_archive() {
        let jar = ArchiveWriter::new()
            .add("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")
            .add("api/Api.class", b"")
            .add("api/impl/Impl.class", b"")
            .add("Main.class", b"")
            .finish();
        let fs = MemoryFileSystem::with_files([("/mp/test-api-1.0.jar", jar)]);

        let artifact = Artifact::open(&fs, Path::new("/mp/test-api-1.0.jar")).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Archive);
        assert_eq!(artifact.packages, set(&["api", "api.impl"]));
        assert!(!artifact.is_explicit());
        assert_eq!(artifact.file_name(), "test-api-1.0.jar");
    }

    #[test]
    fn test_open_explicit_archive() {
        let jar = ArchiveWriter::new()
            .add("module-info.java", b"module m1 { requires public automatic; }")
            .add("module-info.class", b"")
            .add("m1/M1.class", b"")
            .finish();
        let fs = MemoryFileSystem::with_files([("/mp/m1.jar", jar)]);

        let artifact = Artifact::open(&fs, Path::new("/mp/m1.jar")).unwrap();
        let descriptor = artifact.descriptor.unwrap();
        assert!(descriptor.text.starts_with("module m1"));
        assert_eq!(descriptor.path, PathBuf::from("/mp/m1.jar/module-info.java"));
    }

    #[test]
    fn test_open_directory() {
        let fs = MemoryFileSystem::with_files([
            ("/mp/m2/module-info.java", b"module m2 { exports m2; }".to_vec()),
            ("/mp/m2/m2/M2.class", Vec::new()),
            ("/mp/m2/m2/sub/S.class", Vec::new()),
        ]);

        let artifact = Artifact::open(&fs, Path::new("/mp/m2")).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Directory);
        assert_eq!(artifact.packages, set(&["m2", "m2.sub"]));
        assert!(artifact.is_explicit());
    }

    #[test]
    fn test_class_descriptor_alone_is_malformed() {
        let jar = ArchiveWriter::new()
            .add("module-info.class", b"\xCA\xFE\xBA\xBE")
            .finish();
        let fs = MemoryFileSystem::with_files([("/mp/m.jar", jar)]);

        let err = Artifact::open(&fs, Path::new("/mp/m.jar")).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedDescriptor { .. }));
    }

    #[test]
    fn test_corrupt_archive() {
        let fs = MemoryFileSystem::with_files([("/mp/broken.jar", b"not a zip".to_vec())]);
        let err = Artifact::open(&fs, Path::new("/mp/broken.jar")).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedArchive { .. }));
    }

    #[test]
    fn test_missing_file() {
        let fs = MemoryFileSystem::new();
        let err = Artifact::open(&fs, Path::new("/mp/none.jar")).unwrap_err();
        assert!(matches!(err, ResolveError::Io { .. }));
    }
}
