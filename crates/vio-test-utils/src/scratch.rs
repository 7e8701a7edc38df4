//! [`ScratchDir`] fixture for directory enumeration tests.
//!
//! Each fixture lives in its own temporary parent, so tests can run in
//! parallel while still using the fixed `csync_test` directory name.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Name of the directory the scenarios operate on.
pub const TEST_DIR_NAME: &str = "csync_test";

/// `rwxr-xr-x`, the mode scratch directories are created with.
pub const DIR_MODE: u32 = 0o755;

/// A temporary parent directory holding an optional `csync_test` directory.
///
/// # Example
///
/// ```rust,no_run
/// use vio_test_utils::ScratchDir;
///
/// let scratch = ScratchDir::with_test_dir();
/// scratch.write_file("file.txt", "content");
/// assert!(scratch.test_dir().join("file.txt").exists());
/// ```
pub struct ScratchDir {
    temp_dir: TempDir,
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchDir {
    /// Create an empty parent; the test directory does not exist yet.
    pub fn new() -> Self {
        let temp_dir = tempfile::Builder::new()
            .prefix("vio-")
            .tempdir()
            .unwrap_or_else(|e| panic!("ScratchDir::new: failed to create temp dir: {e}"));
        Self { temp_dir }
    }

    /// Create a parent with the test directory already in place.
    pub fn with_test_dir() -> Self {
        let scratch = Self::new();
        scratch.create_test_dir(DIR_MODE);
        scratch
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root().join(TEST_DIR_NAME)
    }

    /// The test directory as a canonical string with a trailing slash.
    ///
    /// # Panics
    /// Panics if the temp path is not valid UTF-8.
    pub fn test_dir_str(&self) -> String {
        let dir = self.test_dir();
        let dir = dir
            .to_str()
            .unwrap_or_else(|| panic!("non UTF-8 scratch path: {}", dir.display()));
        format!("{dir}/")
    }

    /// Create the test directory with an exact mode, ignoring the umask.
    ///
    /// On non-Unix hosts the mode is ignored.
    pub fn create_test_dir(&self, mode: u32) -> PathBuf {
        let dir = self.test_dir();
        fs::create_dir(&dir)
            .unwrap_or_else(|e| panic!("create_test_dir: failed to create {}: {e}", dir.display()));
        set_mode(&dir, mode);
        dir
    }

    /// Write `content` to `rel` under the test directory.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.test_dir().join(rel);
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", path.display()));
        path
    }

    /// Create a subdirectory `rel` under the test directory.
    pub fn create_dir(&self, rel: &str) -> PathBuf {
        let path = self.test_dir().join(rel);
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("create_dir: failed to create {}: {e}", path.display()));
        path
    }

    /// Change the mode of `path` until the returned guard drops.
    pub fn restrict(&self, path: &Path, mode: u32) -> ModeGuard {
        set_mode(path, mode);
        ModeGuard {
            path: path.to_path_buf(),
        }
    }
}

/// Restores [`DIR_MODE`] on drop so the temp directory can be removed.
pub struct ModeGuard {
    path: PathBuf,
}

impl Drop for ModeGuard {
    fn drop(&mut self) {
        set_mode(&self.path, DIR_MODE);
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    // Best-effort: a missing path has nothing to restore.
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) {}

/// Whether the process runs with root privileges, which bypass permission
/// checks that some tests depend on.
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::Uid::effective().is_root()
    }
    #[cfg(not(unix))]
    {
        false
    }
}
