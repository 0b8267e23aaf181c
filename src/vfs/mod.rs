//! Virtual File System (VFS) Module
//!
//! Provides an in-memory tree of files and folders that a build tool can be
//! fed as if it were on disk. Folders are materialized from the paths written
//! into the tree, and every entry can produce a synthesized stat record.

pub mod content;
pub mod path;
pub mod reader;
pub mod stats;
pub mod tree;

pub use content::FileContent;
pub use reader::{DiskFs, MemoryFs, RealFs};
pub use stats::{EntryKind, VirtualStats};
pub use tree::{VfsError, VirtualFileTree};
