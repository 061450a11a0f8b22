/*
 * Logger implementation module for liblogger
 *
 * - A single global logger, created lazily through OnceCell
 * - Configuration from a TOML file or programmatically
 * - Synchronous writes under a mutex; callers of a loader library should
 *   not pay for a background runtime
 *
 * Until one of the init functions runs, only Warn and Error lines are
 * written, to stderr.
 */

use chrono::Utc;
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::{LogConfig, LogLevel};
use crate::outputs::{create_log_output, LogOutput};

static LOGGER_INSTANCE: OnceCell<Mutex<LoggerInner>> = OnceCell::new();

const UNINITIALIZED_THRESHOLD: LogLevel = LogLevel::Warn;

struct LoggerInner {
    config: Option<LogConfig>,
    output: Option<Box<dyn LogOutput>>,
}

impl LoggerInner {
    fn new() -> Self {
        LoggerInner {
            config: None,
            output: None,
        }
    }

    fn init_with_config(&mut self, config: LogConfig) -> Result<(), String> {
        let output = create_log_output(&config)?;
        if let Some(previous) = self.output.as_mut() {
            let _ = previous.flush();
        }
        self.output = Some(output);
        self.config = Some(config);
        Ok(())
    }

    fn threshold(&self) -> LogLevel {
        self.config
            .as_ref()
            .map(|config| config.threshold)
            .unwrap_or(UNINITIALIZED_THRESHOLD)
    }

    fn log(&mut self, level: LogLevel, message: &str, context: Option<&str>, file: &str, line: u32, module: &str) {
        if level < self.threshold() {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let formatted = format_log_message(&timestamp, level, message, context, file, line, module);

        match self.output.as_mut() {
            Some(output) => {
                if let Err(e) = output.write_log(&formatted) {
                    eprintln!("Failed to write log: {}", e);
                }
            }
            None => {
                let _ = writeln!(io::stderr(), "{}", formatted);
            }
        }
    }
}

fn format_log_message(
    timestamp: &str,
    level: LogLevel,
    message: &str,
    context: Option<&str>,
    file: &str,
    line: u32,
    module: &str,
) -> String {
    let level_str = level.as_str();
    match context {
        Some(ctx) => format!(
            "{} [{}] [{}:{}] [{}] {} | {}",
            timestamp, level_str, file, line, module, message, ctx
        ),
        None => format!(
            "{} [{}] [{}:{}] [{}] {}",
            timestamp, level_str, file, line, module, message
        ),
    }
}

fn instance() -> MutexGuard<'static, LoggerInner> {
    LOGGER_INSTANCE
        .get_or_init(|| Mutex::new(LoggerInner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

pub struct Logger;

impl Logger {
    /// Initialize from `app_config.toml` in the working directory, falling
    /// back to defaults when the file is missing.
    pub fn init() {
        if let Err(e) = Self::init_with_config_file("app_config.toml") {
            eprintln!("Failed to initialize logger: {}", e);
        }
    }

    /// Initialize from the `[logging]` table of a TOML file
    pub fn init_with_config_file(config_path: &str) -> Result<(), String> {
        let config = LogConfig::from_file(config_path)?;
        Self::init_with_config(config)
    }

    /// Initialize (or re-initialize) with an explicit configuration
    pub fn init_with_config(config: LogConfig) -> Result<(), String> {
        instance().init_with_config(config)
    }

    /// Whether a message at `level` would currently be written
    pub fn enabled(level: LogLevel) -> bool {
        level >= instance().threshold()
    }

    pub fn debug(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Debug, message, context, file, line, module)
    }

    pub fn info(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Info, message, context, file, line, module)
    }

    pub fn warn(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Warn, message, context, file, line, module)
    }

    pub fn error(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Error, message, context, file, line, module)
    }

    fn log_with_metadata(level: LogLevel, message: &str, context: Option<String>, file: &str, line: u32, module: &str) {
        let file_name = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file);

        instance().log(level, message, context.as_deref(), file_name, line, module);
    }

    /// Flush the configured output
    pub fn flush() -> Result<(), String> {
        match instance().output.as_mut() {
            Some(output) => output.flush(),
            None => Ok(()),
        }
    }
}
