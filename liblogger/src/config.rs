/*
 * Configuration management for liblogger
 *
 * This module handles:
 * - Parsing the [logging] table of a TOML file (app_config.toml by default)
 * - The LogType enum for output destinations (Console, Stderr, File)
 * - The LogLevel enum for severity levels (Debug, Info, Warn, Error)
 *
 * Level and type names are accepted case-insensitively so hand-written
 * config files do not have to match the enum spelling.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log severity levels, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogLevel::parse(&s).ok_or_else(|| {
            serde::de::Error::unknown_variant(&s, &["debug", "info", "warn", "warning", "error"])
        })
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Parses a level name, ignoring case. `warning` is accepted for `Warn`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Supported output destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogType {
    Console,
    Stderr,
    File,
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogType::Console),
            "stderr" => Ok(LogType::Stderr),
            "file" => Ok(LogType::File),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["console", "stdout", "stderr", "file"],
            )),
        }
    }
}

/// Configuration for the logger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Output destination (console, stderr, file)
    #[serde(rename = "type", default = "default_log_type")]
    pub log_type: LogType,

    /// Minimum level that gets written
    #[serde(default = "default_threshold")]
    pub threshold: LogLevel,

    /// File name for file-based logging
    #[serde(default)]
    pub file_path: Option<String>,

    /// Folder the log file is placed in, created on demand
    #[serde(default)]
    pub log_folder: Option<String>,

    /// Flush the file after every line
    #[serde(default)]
    pub force_flush: bool,
}

fn default_log_type() -> LogType {
    LogType::Console
}

fn default_threshold() -> LogLevel {
    LogLevel::Info
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_type: default_log_type(),
            threshold: default_threshold(),
            file_path: None,
            log_folder: None,
            force_flush: false,
        }
    }
}

impl LogConfig {
    /// Reads the configuration from a TOML file.
    ///
    /// A missing or unreadable file is not an error: the defaults are used so
    /// that a program without `app_config.toml` still gets console logging.
    pub fn from_file(file_path: &str) -> Result<Self, String> {
        let config_str = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "Warning: Could not read config file '{}': {}. Using defaults.",
                    file_path, e
                );
                return Ok(LogConfig::default());
            }
        };

        Self::from_toml_str(&config_str)
    }

    /// Parses either a document with a `[logging]` table or a bare table.
    /// The bare form is only tried when there is no `[logging]` table, so a
    /// bad value inside it is reported instead of replaced by defaults.
    pub fn from_toml_str(config_str: &str) -> Result<Self, String> {
        let mut document = config_str
            .parse::<toml::Table>()
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        let table = match document.remove("logging") {
            Some(logging) => logging,
            None => toml::Value::Table(document),
        };
        table
            .try_into()
            .map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Full path of the log file, joining `log_folder` when set.
    pub fn resolved_file_path(&self) -> Option<PathBuf> {
        let file_path = self.file_path.as_ref()?;
        Some(match &self.log_folder {
            Some(folder) => Path::new(folder).join(file_path),
            None => PathBuf::from(file_path),
        })
    }
}
