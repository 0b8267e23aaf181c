use std::collections::HashMap;

use crate::vfs::{FileContent, VirtualStats};

/// Path-keyed caches of a build tool's input filesystem.
///
/// Virtual entries are pushed in so that later lookups by the tool hit the
/// cache instead of the disk.
pub trait HostCache {
    /// Record the stat result for a path
    fn put_stat(&mut self, path: &str, stats: VirtualStats);

    /// Record the content a file read should return
    fn put_content(&mut self, path: &str, content: FileContent);

    /// Record the entry names a directory read should return
    fn put_listing(&mut self, path: &str, names: Vec<String>);
}

/// HashMap-backed host cache
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    stats: HashMap<String, VirtualStats>,
    contents: HashMap<String, FileContent>,
    listings: HashMap<String, Vec<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stat(&self, path: &str) -> Option<&VirtualStats> {
        self.stats.get(path)
    }

    pub fn content(&self, path: &str) -> Option<&FileContent> {
        self.contents.get(path)
    }

    pub fn listing(&self, path: &str) -> Option<&[String]> {
        self.listings.get(path).map(Vec::as_slice)
    }

    /// Number of paths with a cached stat
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Drop everything, as the host does when it purges its input caches
    pub fn purge(&mut self) {
        self.stats.clear();
        self.contents.clear();
        self.listings.clear();
    }
}

impl HostCache for MemoryCache {
    fn put_stat(&mut self, path: &str, stats: VirtualStats) {
        self.stats.insert(path.to_string(), stats);
    }

    fn put_content(&mut self, path: &str, content: FileContent) {
        self.contents.insert(path.to_string(), content);
    }

    fn put_listing(&mut self, path: &str, names: Vec<String>) {
        self.listings.insert(path.to_string(), names);
    }
}
