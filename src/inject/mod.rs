//! Host Injection Module
//!
//! Bridges a [`VirtualFileTree`] into a build tool. The tree is seeded from an
//! [`InjectConfig`], then mirrored into the tool's path-keyed caches through
//! [`HostCache`]: files as stat + content, folders as stat + entry names.
//! Updates made while the tool is watching are reported to a [`ChangeSink`].
//!
//! Callers sharing an `Injector` across threads wrap it in a single `Mutex`;
//! the tree's folder links and file writes are not atomic pairs.

mod cache;

pub use cache::{HostCache, MemoryCache};

use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

use crate::config::{ConfigError, InjectConfig};
use crate::vfs::path::{basename, is_absolute, join};
use crate::vfs::{DiskFs, FileContent, RealFs, VfsError, VirtualFileTree};

/// Errors from building or updating an injector
#[derive(Debug, Error)]
pub enum InjectError {
    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Receives change notifications for files updated while watching
pub trait ChangeSink {
    fn file_changed(&mut self, path: &str, at: DateTime<Utc>);
}

impl<F> ChangeSink for F
where
    F: FnMut(&str, DateTime<Utc>),
{
    fn file_changed(&mut self, path: &str, at: DateTime<Utc>) {
        self(path, at)
    }
}

/// Owns a virtual tree and mirrors it into a host
pub struct Injector<R = DiskFs> {
    name: String,
    tree: VirtualFileTree<R>,
    context: Option<String>,
    watcher: Option<Box<dyn ChangeSink>>,
}

impl Injector<DiskFs> {
    /// Load a JSON config and seed a disk-backed tree from it
    pub fn from_config_file(name: impl Into<String>, path: &Path) -> Result<Self, InjectError> {
        let config = InjectConfig::load(path)?;
        Self::new(name, &config, DiskFs)
    }
}

impl<R: RealFs> Injector<R> {
    /// Seed a tree from config: files are written first, then folders copied.
    ///
    /// Fails on the first folder whose source is missing.
    pub fn new(
        name: impl Into<String>,
        config: &InjectConfig,
        reader: R,
    ) -> Result<Self, InjectError> {
        let name = name.into();
        let mut tree = VirtualFileTree::new(reader);

        for (target, content) in &config.files {
            tree.write_file(target.clone(), content.as_str());
        }

        for (target, source) in &config.folders {
            tree.copy(source, target)?;
        }

        tracing::info!(
            injector = %name,
            files = tree.files().len(),
            folders = tree.folders().len(),
            "Virtual tree seeded"
        );

        Ok(Self {
            name,
            tree,
            context: config.context.clone(),
            watcher: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &VirtualFileTree<R> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut VirtualFileTree<R> {
        &mut self.tree
    }

    /// Host path for a virtual path: relative paths resolve against the
    /// context, absolute ones pass through
    pub fn resolve(&self, path: &str) -> String {
        match &self.context {
            Some(context) if !is_absolute(path) => join(context, path),
            _ => path.to_string(),
        }
    }

    /// Start reporting file updates
    pub fn watch(&mut self, sink: Box<dyn ChangeSink>) {
        self.watcher = Some(sink);
    }

    pub fn unwatch(&mut self) {
        self.watcher = None;
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Mirror the whole tree into the host cache.
    ///
    /// Run once at startup and again whenever the host purges its caches.
    /// Returns the number of entries written.
    pub fn sync(&self, cache: &mut impl HostCache) -> usize {
        for (path, content) in self.tree.files() {
            self.mirror_file(cache, path, content.clone());
        }

        for (path, children) in self.tree.folders() {
            let resolved = self.resolve(path);
            let names = children
                .iter()
                .map(|child| basename(child).to_string())
                .collect();

            cache.put_stat(&resolved, self.tree.statsof(path));
            cache.put_listing(&resolved, names);
        }

        let entries = self.tree.files().len() + self.tree.folders().len();
        tracing::debug!(injector = %self.name, entries, "Synced virtual tree into host cache");
        entries
    }

    /// Replace a file's content in the tree and in the host cache, then
    /// notify the watcher if one is attached
    pub fn update_file(
        &mut self,
        cache: &mut impl HostCache,
        path: &str,
        content: impl Into<FileContent>,
    ) {
        let content = content.into();
        self.tree.write_file(path, content.clone());
        let resolved = self.mirror_file(cache, path, content);

        if let Some(watcher) = self.watcher.as_mut() {
            tracing::debug!(path = %resolved, "Reporting virtual file change");
            watcher.file_changed(&resolved, Utc::now());
        }
    }

    fn mirror_file(&self, cache: &mut impl HostCache, path: &str, content: FileContent) -> String {
        let resolved = self.resolve(path);
        cache.put_stat(&resolved, self.tree.statsof(path));
        cache.put_content(&resolved, content);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::stats::{FILE_MODE, FOLDER_MODE};
    use crate::vfs::MemoryFs;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn vendor_fs() -> MemoryFs {
        let mut real = MemoryFs::new();
        real.add_file("/vendor/product/index.js", "export * from './components';")
            .add_file("/vendor/product/components/ProductItem.jsx", "item");
        real
    }

    fn seeded() -> Injector<MemoryFs> {
        let config = InjectConfig::default()
            .with_context("/project")
            .with_file("src/assets/number-one.js", "module.exports = 1")
            .with_folder("src/module/product", "/vendor/product");

        Injector::new("test", &config, vendor_fs()).unwrap()
    }

    #[test]
    fn test_new_seeds_files_and_folders() {
        let injector = seeded();
        let tree = injector.tree();

        assert_eq!(injector.name(), "test");
        assert!(tree.is_file("src/assets/number-one.js"));
        assert!(tree.is_file("src/module/product/index.js"));
        assert!(tree.is_file("src/module/product/components/ProductItem.jsx"));
        assert_eq!(
            tree.file("src/module/product.js").unwrap().to_text_lossy(),
            "export * from './product/components';"
        );
    }

    #[test]
    fn test_new_fails_on_missing_folder() {
        let config = InjectConfig::default().with_folder("src/module", "/missing");
        let result = Injector::new("test", &config, vendor_fs());

        assert!(matches!(result, Err(InjectError::Vfs(VfsError::SourceNotFound(_)))));
    }

    #[test]
    fn test_resolve() {
        let injector = seeded();
        assert_eq!(injector.resolve("src/a.js"), "/project/src/a.js");
        assert_eq!(injector.resolve("./src/a.js"), "/project/src/a.js");
        assert_eq!(injector.resolve("/abs/a.js"), "/abs/a.js");

        let bare = Injector::new("bare", &InjectConfig::default(), MemoryFs::new()).unwrap();
        assert_eq!(bare.resolve("src/a.js"), "src/a.js");
    }

    #[test]
    fn test_sync_mirrors_tree() {
        let injector = seeded();
        let mut cache = MemoryCache::new();

        let entries = injector.sync(&mut cache);
        assert_eq!(entries, injector.tree().files().len() + injector.tree().folders().len());
        assert_eq!(cache.len(), entries);

        let file = "/project/src/assets/number-one.js";
        assert_eq!(cache.stat(file).unwrap().mode, Some(FILE_MODE));
        assert_eq!(cache.stat(file).unwrap().size, 18);
        assert_eq!(cache.content(file), Some(&FileContent::from("module.exports = 1")));

        let folder = "/project/src/module/product";
        assert_eq!(cache.stat(folder).unwrap().mode, Some(FOLDER_MODE));
        assert_eq!(cache.listing(folder).unwrap(), ["index.js", "components"]);
        // every mkdir through an existing folder links it again
        assert_eq!(cache.listing("/project/src/module").unwrap(), ["product", "product.js", "product"]);
    }

    #[test]
    fn test_sync_after_purge() {
        let injector = seeded();
        let mut cache = MemoryCache::new();

        let first = injector.sync(&mut cache);
        cache.purge();
        assert!(cache.is_empty());

        assert_eq!(injector.sync(&mut cache), first);
        assert!(cache.content("/project/src/module/product/index.js").is_some());
    }

    #[test]
    fn test_update_file_notifies_watcher() {
        let mut injector = seeded();
        let mut cache = MemoryCache::new();

        // not watching yet
        injector.update_file(&mut cache, "src/assets/number-one.js", "module.exports = 2");
        assert_eq!(
            cache.content("/project/src/assets/number-one.js"),
            Some(&FileContent::from("module.exports = 2"))
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        injector.watch(Box::new(move |path: &str, _at: DateTime<Utc>| {
            sink.lock().unwrap().push(path.to_string());
        }));
        assert!(injector.is_watching());

        injector.update_file(&mut cache, "src/assets/two.js", "module.exports = 22");
        assert_eq!(*seen.lock().unwrap(), vec!["/project/src/assets/two.js"]);
        assert_eq!(cache.stat("/project/src/assets/two.js").unwrap().size, 19);
        assert!(injector.tree().is_file("src/assets/two.js"));

        injector.unwatch();
        injector.update_file(&mut cache, "src/assets/two.js", "x");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_from_config_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("vendor");
        std::fs::create_dir_all(source.join("lib")).unwrap();
        std::fs::write(source.join("lib").join("a.js"), "a").unwrap();

        let virtual_root = dir.path().join("virtual").to_string_lossy().to_string();
        let config = serde_json::json!({
            "files": { format!("{}/entry.js", virtual_root): "import './lib/a';" },
            "folders": { format!("{}/vendor", virtual_root): source.to_string_lossy() }
        });
        let path = dir.path().join("inject.json");
        std::fs::write(&path, config.to_string()).unwrap();

        let injector = Injector::from_config_file("disk", &path).unwrap();
        let tree = injector.tree();

        assert!(tree.is_file(&format!("{}/entry.js", virtual_root)));
        assert!(tree.is_file(&format!("{}/vendor/lib/a.js", virtual_root)));
        assert!(tree.is_folder(&virtual_root));
        // the temp dir itself is real
        assert!(!tree.is_folder(&dir.path().to_string_lossy()));
    }
}
