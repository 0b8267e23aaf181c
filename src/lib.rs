//! In-memory virtual file tree for build pipelines.
//!
//! Synthetic sources are written into a [`VirtualFileTree`], which
//! materializes their folders and can describe every entry with a stat record
//! indistinguishable from one read off disk. The [`inject`] module mirrors the
//! tree into a build tool's path-keyed caches.

pub mod config;
pub mod inject;
pub mod vfs;

pub use config::{ConfigError, InjectConfig};
pub use inject::{ChangeSink, HostCache, InjectError, Injector, MemoryCache};
pub use vfs::{DiskFs, FileContent, MemoryFs, RealFs, VfsError, VirtualFileTree, VirtualStats};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// Defaults to `jailbreak_vfs=info`. Does nothing if a global subscriber is
/// already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jailbreak_vfs=info"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
