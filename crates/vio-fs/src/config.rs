//! Enumeration options and their on-disk form

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Options controlling how the local backend fills entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VioConfig {
    /// Stat every entry to fill size, modtime and ownership.
    ///
    /// When false, only the type hint from the directory stream is used.
    pub stat_entries: bool,
    /// Report the target of a symlink instead of the link itself.
    pub follow_symlinks: bool,
}

impl Default for VioConfig {
    fn default() -> Self {
        Self {
            stat_entries: true,
            follow_symlinks: false,
        }
    }
}

impl VioConfig {
    /// Load options from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let parse = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension.as_str() {
            "toml" => {
                let content = read(path)?;
                toml::from_str(&content).map_err(|e| parse("TOML", e.to_string()))
            }
            "json" => {
                let content = read(path)?;
                serde_json::from_str(&content).map_err(|e| parse("JSON", e.to_string()))
            }
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    pub fn with_stat_entries(mut self, stat_entries: bool) -> Self {
        self.stat_entries = stat_entries;
        self
    }

    pub fn with_follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
