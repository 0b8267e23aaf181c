//! Synthesized filesystem metadata for virtual entries.
//!
//! The shape mirrors a conventional `stat` record so that a consumer reading
//! metadata cannot tell a virtual entry from one on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device id reported for virtual files
pub const FILE_DEV: u64 = 8_675_309;
/// Device id reported for virtual folders
pub const FOLDER_DEV: u64 = 16_777_220;
/// Regular file, rw-r--r--
pub const FILE_MODE: u32 = 0o100_644;
/// Directory, rwxr-xr-x
pub const FOLDER_MODE: u32 = 0o040_755;

const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;

pub const BLOCK_SIZE: u64 = 4096;
const OWNER_ID: u32 = 1000;

/// Kind of virtual entry a stat record was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
    Missing,
}

/// Stat record for a virtual path.
///
/// `dev` and `mode` are `None` for paths the tree does not know about.
/// Timestamps serialize as milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualStats {
    pub dev: Option<u64>,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub blksize: u64,
    pub mode: Option<u32>,
    pub size: u64,
    pub blocks: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub atime: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub mtime: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ctime: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub birthtime: DateTime<Utc>,
}

impl VirtualStats {
    /// Build a record stamped with the given time
    pub fn new(kind: EntryKind, size: u64, now: DateTime<Utc>) -> Self {
        let (dev, mode) = match kind {
            EntryKind::File => (Some(FILE_DEV), Some(FILE_MODE)),
            EntryKind::Folder => (Some(FOLDER_DEV), Some(FOLDER_MODE)),
            EntryKind::Missing => (None, None),
        };

        Self {
            dev,
            nlink: 0,
            uid: OWNER_ID,
            gid: OWNER_ID,
            rdev: 0,
            blksize: BLOCK_SIZE,
            mode,
            size,
            blocks: size / BLOCK_SIZE,
            atime: now,
            mtime: now,
            ctime: now,
            birthtime: now,
        }
    }

    pub fn is_file(&self) -> bool {
        self.mode.is_some_and(|mode| mode & S_IFMT == S_IFREG)
    }

    pub fn is_directory(&self) -> bool {
        self.mode.is_some_and(|mode| mode & S_IFMT == S_IFDIR)
    }

    /// Always false; the tree never produces links
    pub fn is_symbolic_link(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_constants() {
        assert_eq!(FILE_MODE, 33188);
        assert_eq!(FOLDER_MODE, 16877);
    }

    #[test]
    fn test_file_record() {
        let now = Utc::now();
        let stats = VirtualStats::new(EntryKind::File, 10_000, now);
        assert_eq!(stats.dev, Some(FILE_DEV));
        assert_eq!(stats.blocks, 2);
        assert!(stats.is_file());
        assert!(!stats.is_directory());
        assert_eq!(stats.atime, stats.birthtime);
    }

    #[test]
    fn test_missing_record() {
        let stats = VirtualStats::new(EntryKind::Missing, 0, Utc::now());
        assert_eq!(stats.dev, None);
        assert_eq!(stats.mode, None);
        assert!(!stats.is_file());
        assert!(!stats.is_directory());
    }

    #[test]
    fn test_serialized_shape() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let stats = VirtualStats::new(EntryKind::Folder, 6, now);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["dev"], 16_777_220);
        assert_eq!(json["mode"], 16877);
        assert_eq!(json["blksize"], 4096);
        assert_eq!(json["mtime"], 1_700_000_000_123i64);

        let missing = serde_json::to_value(VirtualStats::new(EntryKind::Missing, 0, now)).unwrap();
        assert!(missing["dev"].is_null());
        assert!(missing["mode"].is_null());
    }
}
