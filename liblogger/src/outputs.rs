/*
 * Log output implementations
 *
 * - ConsoleOutput: writes lines to stdout
 * - StderrOutput: writes lines to stderr
 * - FileOutput: appends lines to a file, optionally flushing every write
 *
 * Each output implements LogOutput; create_log_output picks one from the
 * configuration.
 */

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::config::{LogConfig, LogType};

pub trait LogOutput: Send {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String>;

    fn flush(&mut self) -> Result<(), String> {
        Ok(())
    }
}

pub struct ConsoleOutput;

impl LogOutput for ConsoleOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        writeln!(io::stdout(), "{}", formatted_message)
            .map_err(|e| format!("Failed to write to console: {}", e))
    }

    fn flush(&mut self) -> Result<(), String> {
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush console output: {}", e))
    }
}

pub struct StderrOutput;

impl LogOutput for StderrOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        writeln!(io::stderr(), "{}", formatted_message)
            .map_err(|e| format!("Failed to write to stderr: {}", e))
    }
}

pub struct FileOutput {
    file: File,
    force_flush: bool,
}

impl FileOutput {
    pub fn new(file_path: &Path, force_flush: bool) -> Result<Self, String> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    format!("Failed to create log directory '{}': {}", parent.display(), e)
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .map_err(|e| format!("Failed to open log file '{}': {}", file_path.display(), e))?;

        Ok(FileOutput { file, force_flush })
    }
}

impl LogOutput for FileOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        self.file
            .write_all(formatted_message.as_bytes())
            .and_then(|_| self.file.write_all(b"\n"))
            .map_err(|e| format!("Failed to write to log file: {}", e))?;

        if self.force_flush {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), String> {
        self.file
            .flush()
            .map_err(|e| format!("Failed to flush log file: {}", e))
    }
}

/// Creates the output described by `config`.
pub fn create_log_output(config: &LogConfig) -> Result<Box<dyn LogOutput>, String> {
    match config.log_type {
        LogType::Console => Ok(Box::new(ConsoleOutput)),
        LogType::Stderr => Ok(Box::new(StderrOutput)),
        LogType::File => {
            let full_path = config
                .resolved_file_path()
                .ok_or_else(|| "File path not specified in configuration".to_string())?;
            Ok(Box::new(FileOutput::new(&full_path, config.force_flush)?))
        }
    }
}
