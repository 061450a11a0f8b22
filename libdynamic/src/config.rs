//! Loader settings, read from the `[loader]` table of a TOML file.
//!
//! ```toml
//! [loader]
//! binding = "now"
//! scope = "local"
//! search_paths = ["./bin", "/opt/plugins"]
//! ```
//!
//! The table can share a file with the `[logging]` table `liblogger` reads.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::library_utils::resolve_library_path;
use crate::platform::{Binding, NativePlatform, OpenFlags, Scope};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub binding: Binding,

    #[serde(default)]
    pub scope: Scope,

    /// Directories searched, in order, by [`LoaderConfig::locate`].
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl LoaderConfig {
    /// Reads the configuration from a TOML file. Unlike the logger config, a
    /// missing file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses either a document with a `[loader]` table or a bare table.
    /// A document without `[loader]` yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut document = content.parse::<toml::Table>()?;
        match document.remove("loader") {
            Some(table) => table.try_into(),
            None => toml::Value::Table(document).try_into(),
        }
    }

    pub fn open_flags(&self) -> OpenFlags {
        OpenFlags {
            binding: self.binding,
            scope: self.scope,
        }
    }

    pub fn platform(&self) -> NativePlatform {
        NativePlatform::new(self.open_flags())
    }

    /// First existing file for the library base name `name` in
    /// `search_paths`.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|folder| resolve_library_path(folder, name))
            .find(|candidate| candidate.is_file())
    }
}
