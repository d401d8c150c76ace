//! Virtual filesystem collaborator
//!
//! The core's file API is a thin veneer over this trait. Path semantics
//! follow the original system: absolute paths start with `/`, `.` and `..`
//! are ordinary names in `readdir` output that callers treat specially, and
//! `readdir` indices are stable only between directory-mutating calls.
//!
//! `RamVfs` is the in-memory backend used by the simulated boot: a map of
//! absolute paths to nodes, seeded with `/` and `/bin`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors a filesystem backend can report. Converted to the kernel error
/// taxonomy at the kernel seam.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// Path does not resolve
    #[error("path not found")]
    NotFound,
    /// Path resolves but has the wrong kind (file vs directory)
    #[error("not a file")]
    NotAFile,
    /// Directory must be empty for this operation
    #[error("directory not empty")]
    NotEmpty,
    /// Target path already exists
    #[error("already exists")]
    AlreadyExists,
    /// Backend rejected the operation
    #[error("backend I/O error: {0}")]
    Io(String),
}

/// One `readdir` result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: usize,
}

/// Filesystem backend contract consumed by the kernel's file API.
pub trait Vfs {
    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    fn file_size(&self, path: &str) -> Result<usize, VfsError>;

    /// Reads up to `buf.len()` bytes starting at `offset`; returns the
    /// number of bytes read (0 at or past end of file).
    fn read_at(&self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, VfsError>;

    /// Writes `data` at `offset`, extending the file as needed.
    fn write_at(&mut self, path: &str, offset: usize, data: &[u8]) -> Result<usize, VfsError>;

    /// Creates an empty file; truncates if it already exists.
    fn create(&mut self, path: &str) -> Result<(), VfsError>;
    fn mkdir(&mut self, path: &str) -> Result<(), VfsError>;

    /// Removes a file. `NotAFile` on a directory.
    fn delete(&mut self, path: &str) -> Result<(), VfsError>;

    /// Removes an empty directory. `NotEmpty` otherwise.
    fn delete_dir(&mut self, path: &str) -> Result<(), VfsError>;

    /// Removes a file or directory tree. Backends that cannot do this
    /// natively may return `Io`; callers then emulate it by collecting
    /// entries and deleting bottom-up.
    fn delete_recursive(&mut self, path: &str) -> Result<(), VfsError>;

    fn rename(&mut self, from: &str, to: &str) -> Result<(), VfsError>;

    /// Directory listing. Indices into the returned vector are stable only
    /// until the next directory-mutating call.
    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError>;

    fn disk_total(&self) -> u64;
    fn disk_free(&self) -> u64;
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem: absolute path → node.
///
/// Capacity accounting is byte-exact against a fixed virtual disk size so
/// the diagnostics surface has something real to report.
pub struct RamVfs {
    nodes: BTreeMap<String, Node>,
    capacity: u64,
}

impl RamVfs {
    pub const DEFAULT_CAPACITY: u64 = 64 * 1024 * 1024;

    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        nodes.insert("/bin".to_string(), Node::Dir);
        Self {
            nodes,
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    /// Seeds a file, creating parent directories as needed. Test helper.
    pub fn with_file(mut self, path: &str, data: &[u8]) -> Self {
        let mut prefix = String::new();
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        for dir in &parts[..parts.len().saturating_sub(1)] {
            prefix.push('/');
            prefix.push_str(dir);
            self.nodes.entry(prefix.clone()).or_insert(Node::Dir);
        }
        self.nodes
            .insert(normalize(path), Node::File(data.to_vec()));
        self
    }

    fn used_bytes(&self) -> u64 {
        self.nodes
            .values()
            .map(|n| match n {
                Node::File(d) => d.len() as u64,
                Node::Dir => 0,
            })
            .sum()
    }

    fn children_of<'a>(&'a self, path: &str) -> impl Iterator<Item = (&'a String, &'a Node)> {
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", normalize(path))
        };
        self.nodes.iter().filter(move |(p, _)| {
            p.starts_with(&prefix) && *p != "/" && !p[prefix.len()..].contains('/')
        })
    }
}

impl Default for RamVfs {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    if path.len() > 1 && path.ends_with('/') {
        path[..path.len() - 1].to_string()
    } else {
        path.to_string()
    }
}

impl Vfs for RamVfs {
    fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(&normalize(path))
    }

    fn is_dir(&self, path: &str) -> bool {
        matches!(self.nodes.get(&normalize(path)), Some(Node::Dir))
    }

    fn file_size(&self, path: &str) -> Result<usize, VfsError> {
        match self.nodes.get(&normalize(path)) {
            Some(Node::File(d)) => Ok(d.len()),
            Some(Node::Dir) => Err(VfsError::NotAFile),
            None => Err(VfsError::NotFound),
        }
    }

    fn read_at(&self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, VfsError> {
        match self.nodes.get(&normalize(path)) {
            Some(Node::File(d)) => {
                if offset >= d.len() {
                    return Ok(0);
                }
                let n = buf.len().min(d.len() - offset);
                buf[..n].copy_from_slice(&d[offset..offset + n]);
                Ok(n)
            }
            Some(Node::Dir) => Err(VfsError::NotAFile),
            None => Err(VfsError::NotFound),
        }
    }

    fn write_at(&mut self, path: &str, offset: usize, data: &[u8]) -> Result<usize, VfsError> {
        match self.nodes.get_mut(&normalize(path)) {
            Some(Node::File(d)) => {
                if d.len() < offset + data.len() {
                    d.resize(offset + data.len(), 0);
                }
                d[offset..offset + data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            Some(Node::Dir) => Err(VfsError::NotAFile),
            None => Err(VfsError::NotFound),
        }
    }

    fn create(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path);
        if self.is_dir(&path) {
            return Err(VfsError::NotAFile);
        }
        self.nodes.insert(path, Node::File(Vec::new()));
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path);
        if self.nodes.contains_key(&path) {
            return Err(VfsError::AlreadyExists);
        }
        self.nodes.insert(path, Node::Dir);
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path);
        match self.nodes.get(&path) {
            Some(Node::File(_)) => {
                self.nodes.remove(&path);
                Ok(())
            }
            Some(Node::Dir) => Err(VfsError::NotAFile),
            None => Err(VfsError::NotFound),
        }
    }

    fn delete_dir(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path);
        match self.nodes.get(&path) {
            Some(Node::Dir) => {
                if self.children_of(&path).next().is_some() {
                    return Err(VfsError::NotEmpty);
                }
                self.nodes.remove(&path);
                Ok(())
            }
            Some(Node::File(_)) => Err(VfsError::NotAFile),
            None => Err(VfsError::NotFound),
        }
    }

    fn delete_recursive(&mut self, path: &str) -> Result<(), VfsError> {
        let path = normalize(path);
        if !self.nodes.contains_key(&path) {
            return Err(VfsError::NotFound);
        }
        let prefix = format!("{}/", path);
        self.nodes.retain(|p, _| p != &path && !p.starts_with(&prefix));
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), VfsError> {
        let from = normalize(from);
        match self.nodes.remove(&from) {
            Some(node) => {
                self.nodes.insert(normalize(to), node);
                Ok(())
            }
            None => Err(VfsError::NotFound),
        }
    }

    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let path = normalize(path);
        if !self.is_dir(&path) {
            return Err(VfsError::NotFound);
        }
        let mut entries = vec![
            DirEntry {
                name: ".".into(),
                is_dir: true,
                size: 0,
            },
            DirEntry {
                name: "..".into(),
                is_dir: true,
                size: 0,
            },
        ];
        for (child, node) in self.children_of(&path) {
            let name = child.rsplit('/').next().unwrap_or(child).to_string();
            entries.push(match node {
                Node::File(d) => DirEntry {
                    name,
                    is_dir: false,
                    size: d.len(),
                },
                Node::Dir => DirEntry {
                    name,
                    is_dir: true,
                    size: 0,
                },
            });
        }
        Ok(entries)
    }

    fn disk_total(&self) -> u64 {
        self.capacity
    }

    fn disk_free(&self) -> u64 {
        self.capacity.saturating_sub(self.used_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_tree_has_bin() {
        let vfs = RamVfs::new();
        assert!(vfs.is_dir("/"));
        assert!(vfs.is_dir("/bin"));
    }

    #[test]
    fn test_read_write_roundtrip() {
        let mut vfs = RamVfs::new();
        vfs.create("/bin/hello").unwrap();
        vfs.write_at("/bin/hello", 0, b"hi there").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(vfs.read_at("/bin/hello", 0, &mut buf).unwrap(), 8);
        assert_eq!(&buf, b"hi there");
        assert_eq!(vfs.file_size("/bin/hello").unwrap(), 8);
    }

    #[test]
    fn test_read_past_end_returns_zero() {
        let vfs = RamVfs::new().with_file("/a.txt", b"abc");
        let mut buf = [0u8; 4];
        assert_eq!(vfs.read_at("/a.txt", 3, &mut buf).unwrap(), 0);
        assert_eq!(vfs.read_at("/a.txt", 1, &mut buf).unwrap(), 2);
    }

    #[test]
    fn test_readdir_includes_dot_entries() {
        let vfs = RamVfs::new().with_file("/docs/readme.txt", b"x");
        let entries = vfs.readdir("/docs").unwrap();
        assert_eq!(entries[0].name, ".");
        assert_eq!(entries[1].name, "..");
        assert_eq!(entries[2].name, "readme.txt");
        assert!(!entries[2].is_dir);
    }

    #[test]
    fn test_delete_dir_requires_empty() {
        let mut vfs = RamVfs::new().with_file("/docs/readme.txt", b"x");
        assert_eq!(vfs.delete_dir("/docs"), Err(VfsError::NotEmpty));
        vfs.delete("/docs/readme.txt").unwrap();
        assert_eq!(vfs.delete_dir("/docs"), Ok(()));
        assert!(!vfs.exists("/docs"));
    }

    #[test]
    fn test_delete_recursive_removes_tree() {
        let mut vfs = RamVfs::new()
            .with_file("/proj/src/main.c", b"x")
            .with_file("/proj/notes.txt", b"y");
        vfs.delete_recursive("/proj").unwrap();
        assert!(!vfs.exists("/proj"));
        assert!(!vfs.exists("/proj/src/main.c"));
        assert!(vfs.exists("/bin"));
    }

    #[test]
    fn test_rename_moves_contents() {
        let mut vfs = RamVfs::new().with_file("/old.txt", b"data");
        vfs.rename("/old.txt", "/new.txt").unwrap();
        assert!(!vfs.exists("/old.txt"));
        assert_eq!(vfs.file_size("/new.txt").unwrap(), 4);
    }

    #[test]
    fn test_disk_accounting() {
        let vfs = RamVfs::new().with_file("/big.bin", &[0u8; 1024]);
        assert_eq!(vfs.disk_total() - vfs.disk_free(), 1024);
    }
}
