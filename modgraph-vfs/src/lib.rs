//! Modgraph Virtual File System
//!
//! A virtual file system abstraction with an in-memory and a native backend.
//! Module path scanning goes through this trait so that resolution can run
//! against a real directory tree or a fixture built in memory.
//!
//! # Usage
//! ```rust,ignore
//! use modgraph_vfs::{VirtualFileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/mp/m1/module-info.java"), b"module m1 {}").unwrap();
//! let children = fs.read_dir(Path::new("/mp")).unwrap();
//! ```

mod error;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::VirtualFileSystem;
