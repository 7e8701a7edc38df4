//! Directory enumeration over native directory streams
//!
//! A [`DirHandle`] owns exactly one native stream. Closing takes the stream
//! out of the handle, so it is released at most once; dropping an open
//! handle releases it as well.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as sys;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{Context, Entry, Error, Result, Vio, VioConfig, encoding};

/// An open directory, owned by the caller until it is closed.
pub struct DirHandle {
    stream: Option<sys::Stream>,
    path: String,
    native_path: PathBuf,
    config: VioConfig,
    exhausted: bool,
}

impl DirHandle {
    /// The canonical path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn native_path(&self) -> &Path {
        &self.native_path
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether enumeration has ended, by exhaustion or by a read error.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn read_next(&mut self) -> Result<Option<Entry>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(Error::Misuse {
                operation: "readdir",
            })?;
        if self.exhausted {
            return Ok(None);
        }

        match stream.next_entry(&self.native_path, &self.config) {
            Ok(Some(entry)) => Ok(Some(entry)),
            Ok(None) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(source) => {
                // The stream position is unreliable after a failed read.
                self.exhausted = true;
                Err(Error::native(&self.native_path, source))
            }
        }
    }

    fn release(&mut self) -> Result<()> {
        let stream = self
            .stream
            .take()
            .ok_or(Error::Misuse {
                operation: "closedir",
            })?;
        stream
            .close()
            .map_err(|e| Error::native(&self.native_path, e))
    }
}

impl fmt::Debug for DirHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirHandle")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

/// Directory enumeration on the local filesystem.
///
/// Paths and entry names are converted with the process locale, so a host
/// on Unix must set `LC_CTYPE` from its environment before opening
/// non-ASCII paths (see [`crate::locale::set_from_environment`]). Without
/// it, non-ASCII names are yielded with `original_path` set and no metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalVio {
    config: VioConfig,
}

impl LocalVio {
    /// Create a backend with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: VioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VioConfig {
        &self.config
    }
}

impl Vio for LocalVio {
    type Handle = DirHandle;

    fn opendir(&self, ctx: &Context, path: &str) -> Result<DirHandle> {
        let native = encoding::to_native(path)?;
        let native_path = native.to_path_buf();
        let stream = sys::Stream::open(&native).map_err(|e| Error::native(&native_path, e))?;

        debug!(run = %ctx.run_id(), path, "opened directory");
        Ok(DirHandle {
            stream: Some(stream),
            path: path.to_string(),
            native_path,
            config: self.config,
            exhausted: false,
        })
    }

    fn readdir(&self, ctx: &Context, handle: &mut DirHandle) -> Result<Option<Entry>> {
        let entry = handle.read_next()?;
        if let Some(entry) = &entry {
            trace!(
                run = %ctx.run_id(),
                dir = handle.path(),
                name = %entry.name,
                file_type = ?entry.file_type,
                "read entry"
            );
        }
        Ok(entry)
    }

    fn close(&self, ctx: &Context, handle: &mut DirHandle) -> Result<()> {
        handle.release()?;
        debug!(run = %ctx.run_id(), path = handle.path(), "closed directory");
        Ok(())
    }
}
