//! Real filesystem readers.
//!
//! The virtual tree never touches the disk directly. It asks a [`RealFs`]
//! whether a path already exists (so folder creation can stop there) and,
//! when copying, walks and reads the source directory through it.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use super::path::{basename, dirname, is_root, normalize};

/// Read-only view of a real filesystem
pub trait RealFs {
    /// Check if a path exists
    fn exists(&self, path: &str) -> bool;

    /// Check if a path is a directory. Only meaningful after `exists`.
    fn is_dir(&self, path: &str) -> bool;

    /// List the names (not paths) of a directory's entries
    fn list_dir(&self, path: &str) -> io::Result<Vec<String>>;

    /// Read the entire contents of a file
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// The host filesystem, via `std::fs`.
///
/// Listings are sorted by name. Symlinks to files are listed and read through;
/// symlinks to directories and dangling symlinks are skipped, so a walk
/// cannot loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl RealFs for DiskFs {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;

            if entry.path_is_symlink() && !entry.path().is_file() {
                tracing::warn!(
                    path = %entry.path().display(),
                    "Skipping directory or dangling symlink while listing"
                );
                continue;
            }

            names.push(entry.file_name().to_string_lossy().to_string());
        }

        Ok(names)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// In-memory stand-in for a real filesystem.
///
/// Adding a file registers its parent directories, stopping short of the
/// root unless the root was registered explicitly with [`MemoryFs::with_root`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: HashMap<String, Vec<u8>>,
    dirs: HashMap<String, Vec<String>>,
}

impl MemoryFs {
    /// Create an empty filesystem with no root
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty filesystem where `/` and `.` exist
    pub fn with_root() -> Self {
        let mut fs = Self::new();
        fs.dirs.insert(String::from("/"), Vec::new());
        fs.dirs.insert(String::from("."), Vec::new());
        fs
    }

    /// Add a file, creating its parent directories
    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> &mut Self {
        let path = normalize(path);
        self.add_dir(&dirname(&path));
        self.link(&path);
        self.files.insert(path, content.into());
        self
    }

    /// Add a directory and its ancestors
    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        let path = normalize(path);
        if self.dirs.contains_key(&path) || is_root(&path) {
            return self;
        }

        self.dirs.insert(path.clone(), Vec::new());
        self.add_dir(&dirname(&path));
        self.link(&path);
        self
    }

    fn link(&mut self, path: &str) {
        let name = basename(path).to_string();
        if let Some(children) = self.dirs.get_mut(&dirname(path)) {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }
}

impl RealFs for MemoryFs {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path) || self.dirs.contains_key(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains_key(path)
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        self.dirs.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("No such directory: {}", path))
        })
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("No such file: {}", path))
        })
    }
}
