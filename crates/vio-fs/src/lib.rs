//! Virtual I/O layer for the sync engine
//!
//! Converts canonical (UTF-8) paths to the host's native encoding and
//! enumerates directories through owned, single-release handles. Native
//! error codes are passed through untouched so the engine can decide what
//! to skip.
//!
//! # Locale
//!
//! On Unix the native encoding is whatever `LC_CTYPE` selects, and a Rust
//! process stays in the ASCII-only `C` locale unless it calls `setlocale`.
//! Hosts must adopt the environment's locale before the first conversion:
//!
//! ```no_run
//! use vio_fs::{Context, LocalVio, Vio, locale};
//!
//! fn main() -> vio_fs::Result<()> {
//!     locale::set_from_environment();
//!
//!     let ctx = Context::new();
//!     let vio = LocalVio::new();
//!     for entry in vio.read_all(&ctx, "/srv/sync/café")? {
//!         println!("{} ({} bytes)", entry.name, entry.size);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod dir;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod locale;
pub mod vio;

pub use config::VioConfig;
pub use context::Context;
pub use dir::{DirHandle, LocalVio};
pub use encoding::{NativePath, from_native, to_native};
pub use entry::{Attributes, Entry, EntryType};
pub use error::{EncodingFailure, Error, Result};
pub use locale::Codeset;
pub use vio::Vio;

/// Open `path` with the default local backend.
pub fn opendir(ctx: &Context, path: &str) -> Result<DirHandle> {
    LocalVio::default().opendir(ctx, path)
}

/// Read the next entry from `handle` with the default local backend.
pub fn readdir(ctx: &Context, handle: &mut DirHandle) -> Result<Option<Entry>> {
    LocalVio::default().readdir(ctx, handle)
}

/// Close `handle`, returning `0` on success and `-1` for a missing or
/// already-closed handle.
pub fn closedir(ctx: &Context, handle: Option<&mut DirHandle>) -> i32 {
    LocalVio::default().closedir(ctx, handle)
}
