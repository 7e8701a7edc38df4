//! Error types for vio-fs

use std::io;
use std::path::PathBuf;

/// Result type for vio-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure code reported for every error at the `0`/`-1` boundary.
pub const FAILURE_CODE: i32 = -1;

/// Why a path could not cross the canonical/native boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingFailure {
    #[error("character {character:?} is not representable in codeset {codeset}")]
    Unrepresentable { character: char, codeset: String },

    #[error("native bytes are not valid in codeset {codeset}")]
    Undecodable { codeset: String },

    #[error("path contains an interior NUL byte")]
    InteriorNul,
}

/// Errors that can occur in vio-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot encode {path:?}: {reason}")]
    Encoding {
        path: String,
        #[source]
        reason: EncodingFailure,
    },

    #[error("access denied: {path}: {source}")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory not found: {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a directory: {path}: {source}")]
    NotADirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{operation} called on a closed or missing directory handle")]
    Misuse { operation: &'static str },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    /// Wrap a plain I/O failure without classifying it.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a failure returned by a native directory call.
    ///
    /// The `source` is kept as-is so [`Error::raw_os_error`] returns the
    /// exact native code.
    pub fn native(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied { path, source },
            io::ErrorKind::NotFound => Self::NotFound { path, source },
            io::ErrorKind::NotADirectory => Self::NotADirectory { path, source },
            _ => Self::Io { path, source },
        }
    }

    pub fn encoding(path: impl Into<String>, reason: EncodingFailure) -> Self {
        Self::Encoding {
            path: path.into(),
            reason,
        }
    }

    /// The native error code, verbatim, when the failure came from the OS.
    ///
    /// Misuse of a closed handle reports `EBADF` on Unix.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::AccessDenied { source, .. }
            | Self::NotFound { source, .. }
            | Self::NotADirectory { source, .. }
            | Self::Io { source, .. } => source.raw_os_error(),
            #[cfg(unix)]
            Self::Misuse { .. } => Some(libc::EBADF),
            _ => None,
        }
    }

    /// The boundary failure code. Always `-1`.
    pub fn code(&self) -> i32 {
        FAILURE_CODE
    }

    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse { .. })
    }
}
