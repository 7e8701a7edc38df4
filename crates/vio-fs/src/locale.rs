//! Access to the process locale's character set
//!
//! The codeset is looked up on every call. Sync runs can cross removable
//! media and network mounts, so nothing here is cached.
//!
//! A Rust program starts in the `C` locale and never reads `LC_CTYPE` from
//! the environment on its own. On glibc that locale's codeset is ASCII
//! (`ANSI_X3.4-1968`), so every non-ASCII path fails to encode and every
//! non-ASCII entry name comes back undecodable until the host adopts the
//! environment's locale once at startup:
//!
//! ```
//! use vio_fs::locale;
//!
//! // Before any thread converts paths.
//! if let Some(codeset) = locale::set_from_environment() {
//!     println!("paths are encoded as {codeset}");
//! }
//! ```

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(unix)]
use tracing::debug;

static LOCALE_LOCK: RwLock<()> = RwLock::new(());

/// The character set the OS expects for filesystem names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Codeset {
    Utf8,
    /// Windows wide-character APIs.
    Utf16,
    /// Any other locale codeset, by its `nl_langinfo` name.
    Other(String),
}

impl Codeset {
    /// Parse a codeset name as reported by the C library.
    pub fn from_name(name: &str) -> Self {
        let folded: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match folded.as_str() {
            "UTF8" => Self::Utf8,
            "UTF16" => Self::Utf16,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Whether canonical UTF-8 bytes can be handed to the OS unchanged.
    pub fn is_utf8(&self) -> bool {
        matches!(self, Self::Utf8)
    }
}

impl fmt::Display for Codeset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("UTF-8"),
            Self::Utf16 => f.write_str("UTF-16"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Write access to the locale for components that call `setlocale`.
///
/// Holding it blocks every path conversion until it is dropped.
pub struct LocaleUpdateGuard {
    _guard: RwLockWriteGuard<'static, ()>,
}

/// Take the write side of the locale lock.
pub fn update_guard() -> LocaleUpdateGuard {
    LocaleUpdateGuard {
        _guard: LOCALE_LOCK.write().unwrap_or_else(PoisonError::into_inner),
    }
}

/// Adopt the environment's `LC_CTYPE` (from `LC_ALL`, `LC_CTYPE` or
/// `LANG`) under the write lock and return the resulting codeset.
///
/// Returns `None`, leaving the locale unchanged, when the environment names
/// a locale the C library does not provide. `setlocale` is process-wide:
/// call this during startup, before other threads use the C library's
/// locale-dependent functions.
#[cfg(unix)]
pub fn set_from_environment() -> Option<Codeset> {
    let _guard = update_guard();
    // SAFETY: the write guard keeps every conversion in this crate out while
    // the locale changes. The empty name selects the environment's locale.
    let applied = unsafe { libc::setlocale(libc::LC_CTYPE, c"".as_ptr()) };
    if applied.is_null() {
        return None;
    }
    let codeset = current_codeset();
    debug!(%codeset, "adopted environment locale");
    Some(codeset)
}

/// Windows paths are always UTF-16; there is no locale to adopt.
#[cfg(windows)]
pub fn set_from_environment() -> Option<Codeset> {
    Some(Codeset::Utf16)
}

fn read_guard() -> RwLockReadGuard<'static, ()> {
    LOCALE_LOCK.read().unwrap_or_else(PoisonError::into_inner)
}

/// The codeset currently active for `LC_CTYPE`.
///
/// Reports the `C` locale's codeset until the process calls `setlocale`,
/// see [`set_from_environment`].
pub fn active_codeset() -> Codeset {
    let _guard = read_guard();
    current_codeset()
}

/// Run `f` with the active codeset while holding the read lock, so the
/// locale cannot change under a conversion in progress.
pub fn with_active_codeset<T>(f: impl FnOnce(&Codeset) -> T) -> T {
    let _guard = read_guard();
    let codeset = current_codeset();
    f(&codeset)
}

#[cfg(unix)]
fn current_codeset() -> Codeset {
    use std::ffi::CStr;

    // SAFETY: nl_langinfo returns a NUL-terminated string owned by the C
    // library that stays valid until the next setlocale call. It is copied
    // out before the read guard is released.
    let name = unsafe {
        let ptr = libc::nl_langinfo(libc::CODESET);
        if ptr.is_null() {
            return Codeset::Other(String::new());
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    };
    Codeset::from_name(&name)
}

#[cfg(windows)]
fn current_codeset() -> Codeset {
    Codeset::Utf16
}
