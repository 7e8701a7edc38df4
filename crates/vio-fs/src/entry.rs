//! Directory entry records yielded by enumeration

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of filesystem object an entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    /// Devices, FIFOs, sockets, or anything whose type is unknown.
    #[default]
    Other,
}

/// Platform-specific metadata, filled as far as the host provides it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub inode: u64,
    pub device: u64,
    /// Permission and file-type bits (`st_mode`).
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    /// Dot-prefixed name, or the platform's hidden flag.
    pub is_hidden: bool,
    /// Native error from the per-entry stat, if it failed.
    pub stat_errno: Option<i32>,
}

/// One directory entry, owned by the caller once yielded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    /// File name in the canonical encoding.
    pub name: String,
    pub file_type: EntryType,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub modtime: i64,
    pub attributes: Attributes,
    /// Native full path, set only when the name could not be decoded.
    ///
    /// `name` then holds a lossy rendering for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<PathBuf>,
}

impl Entry {
    pub(crate) fn named(name: impl Into<String>, file_type: EntryType) -> Self {
        let name = name.into();
        Self {
            attributes: Attributes {
                is_hidden: name.starts_with('.'),
                ..Attributes::default()
            },
            name,
            file_type,
            ..Self::default()
        }
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == EntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.file_type == EntryType::File
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == EntryType::Symlink
    }

    /// Modification time, when the stored timestamp is representable.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.modtime, 0)
    }

    /// Whether the name decoded and the metadata was read successfully.
    ///
    /// Incomplete entries are still yielded so the engine can report them.
    pub fn is_complete(&self) -> bool {
        self.original_path.is_none() && self.attributes.stat_errno.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_names_are_hidden() {
        let hidden = Entry::named(".hidden", EntryType::File);
        let visible = Entry::named("visible", EntryType::File);
        assert!(hidden.attributes.is_hidden);
        assert!(!visible.attributes.is_hidden);
    }

    #[test]
    fn modified_converts_epoch_seconds() {
        let mut entry = Entry::named("f", EntryType::File);
        entry.modtime = 1_700_000_000;
        assert_eq!(entry.modified().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn failed_stat_marks_entry_incomplete() {
        let mut entry = Entry::named("gone", EntryType::Other);
        assert!(entry.is_complete());
        entry.attributes.stat_errno = Some(2);
        assert!(!entry.is_complete());
    }

    #[test]
    fn entry_type_serializes_snake_case() {
        let json = serde_json::to_string(&EntryType::Symlink).unwrap();
        assert_eq!(json, "\"symlink\"");
    }
}
