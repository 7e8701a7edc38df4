//! `opendir`/`readdir`/`closedir` streams over a native `DIR`
//!
//! The descriptor is opened through `nix`; the stream itself is driven with
//! `libc::readdir` so that a failed read surfaces its `errno` instead of
//! looking like the end of the directory.

use std::ffi::{CStr, OsStr};
use std::io;
use std::mem::ManuallyDrop;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::NonNull;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::{self, FileStat, Mode, SFlag};
use nix::unistd;

use crate::{Entry, EntryType, NativePath, VioConfig, encoding};

pub(super) struct Stream {
    dir: NonNull<libc::DIR>,
}

// SAFETY: the stream is owned by exactly one `Stream` and is only used
// through `&mut self` or by value, so it never crosses threads concurrently.
unsafe impl Send for Stream {}

impl Stream {
    pub(super) fn open(path: &NativePath) -> io::Result<Self> {
        let fd = fcntl::open(
            path.as_c_str(),
            OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_CLOEXEC,
            Mode::empty(),
        )
        .map_err(native_error)?;

        // SAFETY: `fd` is an open directory descriptor. On success the stream
        // takes ownership of it and `closedir` releases both.
        let dir = unsafe { libc::fdopendir(fd) };
        match NonNull::new(dir) {
            Some(dir) => Ok(Self { dir }),
            None => {
                let err = io::Error::last_os_error();
                let _ = unistd::close(fd);
                Err(err)
            }
        }
    }

    /// Next real entry, skipping `.` and `..`.
    pub(super) fn next_entry(
        &mut self,
        dir: &Path,
        config: &VioConfig,
    ) -> io::Result<Option<Entry>> {
        loop {
            // readdir signals both end of stream and failure with NULL.
            Errno::clear();
            // SAFETY: `self.dir` is an open stream owned by this value.
            let raw = unsafe { libc::readdir(self.dir.as_ptr()) };
            let Some(raw) = NonNull::new(raw) else {
                return match Errno::last_raw() {
                    0 => Ok(None),
                    code => Err(io::Error::from_raw_os_error(code)),
                };
            };

            // SAFETY: the dirent stays valid until the next readdir on this
            // stream; everything needed is copied out before the loop repeats.
            let (name, hint, inode) = unsafe {
                let raw = raw.as_ref();
                (
                    CStr::from_ptr(raw.d_name.as_ptr()).to_bytes().to_vec(),
                    type_hint(raw),
                    inode_hint(raw),
                )
            };
            if name == b"." || name == b".." {
                continue;
            }
            let mut entry = build_entry(dir, &name, hint, config);
            if entry.attributes.inode == 0 {
                entry.attributes.inode = inode;
            }
            return Ok(Some(entry));
        }
    }

    /// Release the stream, reporting the native `closedir` result.
    pub(super) fn close(self) -> io::Result<()> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `Drop` is suppressed, so the stream is closed exactly once.
        let rc = unsafe { libc::closedir(this.dir.as_ptr()) };
        Errno::result(rc).map(drop).map_err(native_error)
    }

    /// Point the stream's descriptor at a regular file so the next read
    /// fails with `ENOTDIR`.
    #[cfg(all(test, target_os = "linux"))]
    pub(super) fn break_descriptor(&self) {
        use std::os::unix::io::AsRawFd;

        let file = tempfile::tempfile().unwrap();
        // SAFETY: `self.dir` is an open stream owned by this value.
        let fd = unsafe { libc::dirfd(self.dir.as_ptr()) };
        unistd::dup2(file.as_raw_fd(), fd).unwrap();
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        // SAFETY: an unclosed stream is owned by this value alone.
        unsafe {
            libc::closedir(self.dir.as_ptr());
        }
    }
}

fn native_error(errno: Errno) -> io::Error {
    io::Error::from_raw_os_error(errno as i32)
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn type_hint(raw: &libc::dirent) -> Option<EntryType> {
    match raw.d_type {
        libc::DT_UNKNOWN => None,
        libc::DT_REG => Some(EntryType::File),
        libc::DT_DIR => Some(EntryType::Directory),
        libc::DT_LNK => Some(EntryType::Symlink),
        _ => Some(EntryType::Other),
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn type_hint(_raw: &libc::dirent) -> Option<EntryType> {
    None
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
))]
#[allow(clippy::unnecessary_cast)]
fn inode_hint(raw: &libc::dirent) -> u64 {
    raw.d_ino as u64
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
fn inode_hint(_raw: &libc::dirent) -> u64 {
    0
}

fn build_entry(dir: &Path, name: &[u8], hint: Option<EntryType>, config: &VioConfig) -> Entry {
    let full_path = dir.join(OsStr::from_bytes(name));
    let file_type = hint.unwrap_or_default();

    let Ok(canonical) = encoding::from_native(name) else {
        let mut entry = Entry::named(String::from_utf8_lossy(name), file_type);
        entry.original_path = Some(full_path);
        return entry;
    };

    let mut entry = Entry::named(canonical, file_type);
    if !config.stat_entries {
        return entry;
    }

    let metadata = if config.follow_symlinks {
        stat::stat(&full_path)
    } else {
        stat::lstat(&full_path)
    };
    match metadata {
        Ok(st) => apply_stat(&mut entry, &st),
        // Keep the stream's type hint; the engine decides what to do with it.
        Err(errno) => entry.attributes.stat_errno = Some(errno as i32),
    }
    entry
}

fn entry_type_from_mode(st: &FileStat) -> EntryType {
    let format = SFlag::from_bits_truncate(st.st_mode & SFlag::S_IFMT.bits());
    if format == SFlag::S_IFREG {
        EntryType::File
    } else if format == SFlag::S_IFDIR {
        EntryType::Directory
    } else if format == SFlag::S_IFLNK {
        EntryType::Symlink
    } else {
        EntryType::Other
    }
}

// stat field widths differ between platforms.
#[allow(clippy::unnecessary_cast, clippy::cast_sign_loss)]
fn apply_stat(entry: &mut Entry, st: &FileStat) {
    entry.file_type = entry_type_from_mode(st);
    entry.size = u64::try_from(st.st_size).unwrap_or(0);
    entry.modtime = st.st_mtime as i64;

    let attributes = &mut entry.attributes;
    attributes.inode = st.st_ino as u64;
    attributes.device = st.st_dev as u64;
    attributes.mode = st.st_mode as u32;
    attributes.nlink = st.st_nlink as u64;
    attributes.uid = st.st_uid;
    attributes.gid = st.st_gid;

    #[cfg(target_os = "macos")]
    {
        attributes.is_hidden |= (st.st_flags as u64) & (libc::UF_HIDDEN as u64) != 0;
    }
}
