//! The backend seam the sync engine enumerates through

use crate::error::FAILURE_CODE;
use crate::{Context, Entry, Result};

/// A directory enumeration backend.
///
/// Handles returned by [`Vio::opendir`] must be released exactly once,
/// through [`Vio::close`] or [`Vio::closedir`]. Use [`Vio::with_dir`] when the
/// caller has early returns between open and close.
pub trait Vio {
    type Handle;

    /// Open the directory at a canonical path.
    fn opendir(&self, ctx: &Context, path: &str) -> Result<Self::Handle>;

    /// Advance `handle` by one entry.
    ///
    /// `Ok(None)` means the directory is exhausted, and stays that way.
    fn readdir(&self, ctx: &Context, handle: &mut Self::Handle) -> Result<Option<Entry>>;

    /// Release `handle`. A second close is a misuse error.
    fn close(&self, ctx: &Context, handle: &mut Self::Handle) -> Result<()>;

    /// Close with the `0` / `-1` return convention.
    ///
    /// `None` stands for a handle that was never opened and returns `-1`
    /// without touching anything.
    fn closedir(&self, ctx: &Context, handle: Option<&mut Self::Handle>) -> i32 {
        let Some(handle) = handle else {
            return FAILURE_CODE;
        };
        match self.close(ctx, handle) {
            Ok(()) => 0,
            Err(err) => err.code(),
        }
    }

    /// Open `path`, run `f` on the handle, and close it on every exit path.
    ///
    /// An error from `f` takes precedence over an error from closing.
    ///
    /// The helper owns the release: `f` must not close the handle. If it
    /// does, the helper's own close is a second close and the call returns
    /// [`Error::Misuse`](crate::Error::Misuse) even though `f` succeeded.
    fn with_dir<T, F>(&self, ctx: &Context, path: &str, f: F) -> Result<T>
    where
        F: FnOnce(&Self, &mut Self::Handle) -> Result<T>,
    {
        let mut handle = self.opendir(ctx, path)?;
        let outcome = f(self, &mut handle);
        let closed = self.close(ctx, &mut handle);
        let value = outcome?;
        closed?;
        Ok(value)
    }

    /// Drain every entry of `path`.
    fn read_all(&self, ctx: &Context, path: &str) -> Result<Vec<Entry>> {
        self.with_dir(ctx, path, |vio, handle| {
            let mut entries = Vec::new();
            while let Some(entry) = vio.readdir(ctx, handle)? {
                entries.push(entry);
            }
            Ok(entries)
        })
    }
}
