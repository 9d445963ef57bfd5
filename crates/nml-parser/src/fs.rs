/*
 * fs.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Filesystem access used by includes and code fragments.
//!
//! The parser never touches the process working directory. Relative paths
//! are joined onto the parse context's directory before they reach a
//! [`FileSystem`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Read access to source files.
pub trait FileSystem {
    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` names a readable file.
    fn is_file(&self, path: &Path) -> bool;
}

/// The real filesystem through `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Filesystem with no files (for parsing without I/O).
#[derive(Debug, Clone, Default)]
pub struct NullFileSystem;

impl FileSystem for NullFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} (no filesystem)", path.display()),
        ))
    }

    fn is_file(&self, _path: &Path) -> bool {
        false
    }
}

/// Files held in memory, keyed by path.
///
/// Paths are normalized lexically, so `./a/../b.nml` and `b.nml` name the
/// same file.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
        self.files.insert(normalize(path.as_ref()), content.into());
        self
    }

    pub fn with_files(
        files: impl IntoIterator<Item = (impl AsRef<Path>, impl Into<String>)>,
    ) -> Self {
        let mut fs = Self::new();
        for (path, content) in files {
            fs.add(path, content);
        }
        fs
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

/// Drop `.` components and fold `..` into their parent.
pub fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fs() {
        let fs = MemoryFileSystem::with_files([("docs/a.nml", "A"), ("b.nml", "B")]);

        assert_eq!(fs.read_to_string(Path::new("docs/a.nml")).unwrap(), "A");
        assert_eq!(fs.read_to_string(Path::new("./docs/../b.nml")).unwrap(), "B");
        assert!(fs.is_file(Path::new("b.nml")));
        assert!(!fs.is_file(Path::new("c.nml")));

        let err = fs.read_to_string(Path::new("c.nml")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_null_fs() {
        let fs = NullFileSystem;
        assert!(fs.read_to_string(Path::new("a")).is_err());
        assert!(!fs.is_file(Path::new("a")));
    }

    #[test]
    fn test_real_fs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.nml");
        std::fs::write(&path, "content").unwrap();

        let fs = RealFileSystem;
        assert!(fs.is_file(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "content");
        assert!(!fs.is_file(dir.path()));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(normalize(Path::new("/x/../../a")), PathBuf::from("/a"));
    }
}
