//! Virtual File Tree
//!
//! The VirtualFileTree keeps two maps: file path to content, and folder path
//! to the child paths registered under it. Folders are materialized on demand
//! whenever something is written below them, stopping at paths that already
//! exist on the real filesystem.

use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;

use super::content::FileContent;
use super::path::{basename, dirname, is_root, join, normalize_dir, stem};
use super::reader::{DiskFs, RealFs};
use super::stats::{EntryKind, VirtualStats};

/// Errors that can occur during VFS operations
#[derive(Debug, Clone, Error)]
pub enum VfsError {
    /// The copy source does not exist or is not a directory
    #[error("Source: {0} not found")]
    SourceNotFound(String),

    /// The real filesystem failed while walking or reading the copy source
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// In-memory tree of virtual files and folders.
///
/// A path may be present in both maps; queries prefer the file entry.
#[derive(Debug, Clone, Default)]
pub struct VirtualFileTree<R = DiskFs> {
    /// Real filesystem consulted by `mkdir` and `copy`
    reader: R,

    /// File contents indexed by path
    files: HashMap<String, FileContent>,

    /// Child paths of each virtual folder, in insertion order
    folders: HashMap<String, Vec<String>>,
}

impl VirtualFileTree<DiskFs> {
    /// Create an empty tree backed by the host filesystem
    pub fn on_disk() -> Self {
        Self::new(DiskFs)
    }
}

impl<R: RealFs> VirtualFileTree<R> {
    /// Create an empty tree backed by the given reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            files: HashMap::new(),
            folders: HashMap::new(),
        }
    }

    /// Get the real filesystem reader
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// All virtual files
    pub fn files(&self) -> &HashMap<String, FileContent> {
        &self.files
    }

    /// All virtual folders with their registered children
    pub fn folders(&self) -> &HashMap<String, Vec<String>> {
        &self.folders
    }

    pub fn file(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    pub fn folder(&self, path: &str) -> Option<&[String]> {
        self.folders.get(path).map(Vec::as_slice)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.folders.contains_key(path)
    }

    /// Create or replace a file and link it into its parent folder.
    ///
    /// Writing the same path twice links it twice.
    pub fn write_file(
        &mut self,
        path: impl Into<String>,
        content: impl Into<FileContent>,
    ) -> &mut Self {
        let path = path.into();
        self.files.insert(path.clone(), content.into());

        let folder = self.mkdir(&dirname(&path));
        if let Some(children) = self.folders.get_mut(&folder) {
            children.push(path);
        }

        self
    }

    /// Recursively create virtual folders.
    ///
    /// Stops at paths the real filesystem already has, and at the root. Every
    /// call links `path` into its parent again, even if `path` already exists.
    pub fn mkdir(&mut self, path: &str) -> String {
        if self.reader.exists(path) || is_root(path) {
            return path.to_string();
        }

        if !self.folders.contains_key(path) {
            tracing::debug!(path = %path, "Creating virtual folder");
            self.folders.insert(path.to_string(), Vec::new());
        }

        let parent = dirname(path);
        self.mkdir(&parent);

        if let Some(children) = self.folders.get_mut(&parent) {
            children.push(path.to_string());
        }

        path.to_string()
    }

    /// Copy a real directory into the tree using the tree's own reader.
    ///
    /// Every file below `source` lands at the same relative path below
    /// `target`. The source is read in full before the tree is touched; a
    /// failed copy leaves the tree unchanged.
    pub fn copy(&mut self, source: &str, target: &str) -> Result<&mut Self, VfsError> {
        let source = normalize_dir(source);
        let loaded = load_dir(&self.reader, &source)?;
        Ok(self.write_loaded(loaded, &source, target))
    }

    /// Copy a real directory into the tree using another reader
    pub fn copy_from(
        &mut self,
        source: &str,
        target: &str,
        reader: &impl RealFs,
    ) -> Result<&mut Self, VfsError> {
        let source = normalize_dir(source);
        let loaded = load_dir(reader, &source)?;
        Ok(self.write_loaded(loaded, &source, target))
    }

    fn write_loaded(
        &mut self,
        loaded: Vec<(String, Vec<u8>)>,
        source: &str,
        target: &str,
    ) -> &mut Self {
        let mut written = 0usize;

        for (file, content) in loaded {
            let destination = join(target, relative_to(&file, source));
            self.write_file(destination.clone(), content);
            written += 1;

            if stem(&destination) == "index" && self.redirect_index(&destination) {
                written += 1;
            }
        }

        tracing::info!(
            source = %source,
            target = %target,
            files = written,
            "Copied directory into virtual tree"
        );

        self
    }

    /// Write `<dir>.js` next to `<dir>/index.*` so that importing `./dir`
    /// resolves without directory-index lookup.
    ///
    /// Every `./` in the content is rewritten to `./<dir name>/`. This is a
    /// plain text replace, not an import parser.
    fn redirect_index(&mut self, destination: &str) -> bool {
        let dir = dirname(destination);
        if is_root(&dir) {
            return false;
        }

        let sibling = format!("{}.js", dir);
        if self.files.contains_key(&sibling) {
            return false;
        }

        let prefix = format!("./{}/", basename(&dir));
        let rewritten = match self.files.get(destination) {
            Some(content) => content.to_text_lossy().replace("./", &prefix),
            None => return false,
        };

        tracing::debug!(path = %sibling, "Writing index redirect");
        self.write_file(sibling, rewritten);
        true
    }

    /// Size in bytes of a file, or of a folder's direct file children
    pub fn sizeof(&self, path: &str) -> u64 {
        if let Some(content) = self.files.get(path) {
            return content.len();
        }

        match self.folders.get(path) {
            Some(children) => children
                .iter()
                .filter_map(|child| self.files.get(child))
                .map(FileContent::len)
                .sum(),
            None => 0,
        }
    }

    /// Stat record for a path, stamped with the current time
    pub fn statsof(&self, path: &str) -> VirtualStats {
        let kind = if self.files.contains_key(path) {
            EntryKind::File
        } else if self.folders.contains_key(path) {
            EntryKind::Folder
        } else {
            EntryKind::Missing
        };

        VirtualStats::new(kind, self.sizeof(path), Utc::now())
    }
}

/// Path of `file` below the normalized directory `source`.
///
/// Matches whole components only. A root source has no prefix to strip; its
/// entries are joined onto the target as they are.
fn relative_to<'a>(file: &'a str, source: &str) -> &'a str {
    if is_root(source) {
        return file;
    }

    match file.strip_prefix(source) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => file,
    }
}

/// Read every file below `source`, depth first.
///
/// Fails before anything is read if `source` is not a directory.
fn load_dir(reader: &impl RealFs, source: &str) -> Result<Vec<(String, Vec<u8>)>, VfsError> {
    if !reader.exists(source) || !reader.is_dir(source) {
        return Err(VfsError::SourceNotFound(source.to_string()));
    }

    let mut files = Vec::new();
    walk(reader, source, &mut files)?;

    files
        .into_iter()
        .map(|file| {
            let content = reader.read(&file).map_err(|e| VfsError::Read {
                path: file.clone(),
                message: e.to_string(),
            })?;
            Ok((file, content))
        })
        .collect()
}

fn walk(reader: &impl RealFs, folder: &str, files: &mut Vec<String>) -> Result<(), VfsError> {
    let names = reader.list_dir(folder).map_err(|e| VfsError::Read {
        path: folder.to_string(),
        message: e.to_string(),
    })?;

    for name in names {
        let item = join(folder, &name);
        if reader.is_dir(&item) {
            walk(reader, &item, files)?;
        } else {
            files.push(item);
        }
    }

    Ok(())
}
