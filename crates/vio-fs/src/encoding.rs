//! Conversion between canonical (UTF-8) paths and the native encoding
//!
//! Canonical paths are converted at every I/O boundary and the native
//! buffer is owned by the caller. Characters the active codeset cannot
//! represent are an error, never replaced or dropped.

use std::path::PathBuf;

use crate::locale::{self, Codeset};
use crate::{EncodingFailure, Error, Result};

/// An owned path in the OS's native encoding, NUL-terminated.
///
/// Dropping it releases the converted buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativePath {
    #[cfg(unix)]
    inner: std::ffi::CString,
    #[cfg(windows)]
    inner: Vec<u16>,
}

#[cfg(unix)]
impl NativePath {
    pub fn as_c_str(&self) -> &std::ffi::CStr {
        &self.inner
    }

    /// Native bytes without the trailing NUL.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        use std::os::unix::ffi::OsStrExt;
        PathBuf::from(std::ffi::OsStr::from_bytes(self.as_bytes()))
    }

    /// Convert back to the canonical form under the active locale.
    pub fn to_canonical(&self) -> Result<String> {
        from_native(self.as_bytes())
    }
}

#[cfg(windows)]
impl NativePath {
    /// UTF-16 code units without the trailing NUL.
    pub fn as_wide(&self) -> &[u16] {
        &self.inner[..self.inner.len() - 1]
    }

    pub fn to_path_buf(&self) -> PathBuf {
        use std::os::windows::ffi::OsStringExt;
        PathBuf::from(std::ffi::OsString::from_wide(self.as_wide()))
    }

    pub fn to_canonical(&self) -> Result<String> {
        from_native(self.as_wide())
    }
}

/// Convert a canonical path into the native encoding.
///
/// On Unix the target codeset is the one `LC_CTYPE` currently selects. The
/// process must have adopted its environment's locale (see
/// [`locale::set_from_environment`]); in the default `C` locale only ASCII
/// paths are representable.
///
/// # Errors
///
/// Returns [`Error::Encoding`] when the path holds an interior NUL or a
/// character the active codeset cannot represent.
pub fn to_native(path: &str) -> Result<NativePath> {
    if path.contains('\0') {
        return Err(Error::encoding(path, EncodingFailure::InteriorNul));
    }
    locale::with_active_codeset(|codeset| sys::encode(path, codeset))
        .map(|inner| NativePath { inner })
        .map_err(|reason| Error::encoding(path, reason))
}

/// Convert native filesystem bytes (UTF-16 units on Windows) into the
/// canonical form.
///
/// # Errors
///
/// Returns [`Error::Encoding`] when the input is not valid in the active
/// codeset.
#[cfg(unix)]
pub fn from_native(native: &[u8]) -> Result<String> {
    locale::with_active_codeset(|codeset| sys::decode(native, codeset))
        .map_err(|reason| Error::encoding(String::from_utf8_lossy(native), reason))
}

#[cfg(windows)]
pub fn from_native(native: &[u16]) -> Result<String> {
    locale::with_active_codeset(|codeset| sys::decode(native, codeset))
        .map_err(|reason| Error::encoding(String::from_utf16_lossy(native), reason))
}

#[cfg(unix)]
mod sys {
    use std::ffi::CString;
    use std::ptr;

    use libc::{c_char, size_t, wchar_t};

    use super::{Codeset, EncodingFailure};

    // Locale-aware conversions from the C library.
    unsafe extern "C" {
        fn wcstombs(dest: *mut c_char, src: *const wchar_t, n: size_t) -> size_t;
        fn mbstowcs(dest: *mut wchar_t, src: *const c_char, n: size_t) -> size_t;
    }

    const CONVERSION_FAILED: size_t = size_t::MAX;

    pub(super) fn encode(path: &str, codeset: &Codeset) -> Result<CString, EncodingFailure> {
        let bytes = if codeset.is_utf8() {
            path.as_bytes().to_vec()
        } else {
            to_multibyte(path, codeset)?
        };
        // Interior NULs are rejected before conversion, and no multibyte
        // encoding produces a zero byte for a non-NUL character.
        CString::new(bytes).map_err(|_| EncodingFailure::InteriorNul)
    }

    pub(super) fn decode(native: &[u8], codeset: &Codeset) -> Result<String, EncodingFailure> {
        if codeset.is_utf8() {
            return String::from_utf8(native.to_vec()).map_err(|_| undecodable(codeset));
        }
        let source = CString::new(native).map_err(|_| EncodingFailure::InteriorNul)?;

        // SAFETY: `source` is NUL-terminated; a null destination only
        // measures the converted length.
        let len = unsafe { mbstowcs(ptr::null_mut(), source.as_ptr(), 0) };
        if len == CONVERSION_FAILED {
            return Err(undecodable(codeset));
        }
        let mut wide: Vec<wchar_t> = vec![0; len + 1];
        // SAFETY: `wide` has room for `len` characters plus the terminator.
        let written = unsafe { mbstowcs(wide.as_mut_ptr(), source.as_ptr(), wide.len()) };
        if written == CONVERSION_FAILED {
            return Err(undecodable(codeset));
        }

        wide[..written]
            .iter()
            .map(|&unit| char::from_u32(unit as u32).ok_or_else(|| undecodable(codeset)))
            .collect()
    }

    fn to_multibyte(path: &str, codeset: &Codeset) -> Result<Vec<u8>, EncodingFailure> {
        let wide = widen(path);

        // SAFETY: `wide` is NUL-terminated.
        let len = unsafe { wcstombs(ptr::null_mut(), wide.as_ptr(), 0) };
        if len == CONVERSION_FAILED {
            return Err(unrepresentable(path, codeset));
        }
        let mut buf = vec![0u8; len + 1];
        // SAFETY: `buf` has room for `len` bytes plus the terminator.
        let written = unsafe { wcstombs(buf.as_mut_ptr().cast(), wide.as_ptr(), buf.len()) };
        if written == CONVERSION_FAILED {
            return Err(unrepresentable(path, codeset));
        }
        buf.truncate(written);
        Ok(buf)
    }

    fn widen(s: &str) -> Vec<wchar_t> {
        s.chars()
            .map(|c| c as u32 as wchar_t)
            .chain(std::iter::once(0))
            .collect()
    }

    /// Find the first character the codeset rejects on its own.
    fn unrepresentable(path: &str, codeset: &Codeset) -> EncodingFailure {
        let character = path
            .chars()
            .find(|&c| {
                let wide = [c as u32 as wchar_t, 0];
                // SAFETY: `wide` is NUL-terminated.
                unsafe { wcstombs(ptr::null_mut(), wide.as_ptr(), 0) == CONVERSION_FAILED }
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        EncodingFailure::Unrepresentable {
            character,
            codeset: codeset.to_string(),
        }
    }

    fn undecodable(codeset: &Codeset) -> EncodingFailure {
        EncodingFailure::Undecodable {
            codeset: codeset.to_string(),
        }
    }
}

#[cfg(windows)]
mod sys {
    use super::{Codeset, EncodingFailure};

    pub(super) fn encode(path: &str, _codeset: &Codeset) -> Result<Vec<u16>, EncodingFailure> {
        Ok(path.encode_utf16().chain(std::iter::once(0)).collect())
    }

    pub(super) fn decode(native: &[u16], codeset: &Codeset) -> Result<String, EncodingFailure> {
        String::from_utf16(native).map_err(|_| EncodingFailure::Undecodable {
            codeset: codeset.to_string(),
        })
    }
}
