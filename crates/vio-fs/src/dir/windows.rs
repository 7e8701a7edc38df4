//! Directory streams over `FindFirstFileW`, via `std::fs::ReadDir`

use std::fs::{self, DirEntry, FileType, ReadDir};
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::fs::MetadataExt;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::{Entry, EntryType, NativePath, VioConfig, encoding};

const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

pub(super) struct Stream {
    entries: ReadDir,
}

impl Stream {
    pub(super) fn open(path: &NativePath) -> io::Result<Self> {
        Ok(Self {
            entries: fs::read_dir(path.to_path_buf())?,
        })
    }

    pub(super) fn next_entry(
        &mut self,
        _dir: &Path,
        config: &VioConfig,
    ) -> io::Result<Option<Entry>> {
        for raw in self.entries.by_ref() {
            let raw = raw?;
            let name: Vec<u16> = raw.file_name().encode_wide().collect();
            if name == [u16::from(b'.')] || name == [u16::from(b'.'), u16::from(b'.')] {
                continue;
            }
            return Ok(Some(build_entry(&raw, &name, config)));
        }
        Ok(None)
    }

    /// `FindClose` runs when the iterator drops and its result is not exposed.
    pub(super) fn close(self) -> io::Result<()> {
        drop(self.entries);
        Ok(())
    }
}

fn entry_type(ft: FileType) -> EntryType {
    if ft.is_symlink() {
        EntryType::Symlink
    } else if ft.is_dir() {
        EntryType::Directory
    } else if ft.is_file() {
        EntryType::File
    } else {
        EntryType::Other
    }
}

fn build_entry(raw: &DirEntry, name: &[u16], config: &VioConfig) -> Entry {
    let file_type = raw.file_type().map_or(EntryType::Other, entry_type);

    let Ok(canonical) = encoding::from_native(name) else {
        let mut entry = Entry::named(String::from_utf16_lossy(name), file_type);
        entry.original_path = Some(raw.path());
        return entry;
    };

    let mut entry = Entry::named(canonical, file_type);
    if !config.stat_entries {
        return entry;
    }

    let metadata = if config.follow_symlinks {
        fs::metadata(raw.path())
    } else {
        raw.metadata()
    };
    match metadata {
        Ok(md) => {
            if config.follow_symlinks {
                entry.file_type = entry_type(md.file_type());
            }
            entry.size = md.len();
            entry.modtime = md
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .and_then(|d| i64::try_from(d.as_secs()).ok())
                .unwrap_or(0);
            entry.attributes.mode = md.file_attributes();
            entry.attributes.is_hidden |= md.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0;
        }
        Err(e) => entry.attributes.stat_errno = e.raw_os_error(),
    }
    entry
}
