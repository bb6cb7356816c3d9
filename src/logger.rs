//! Application logging.
//!
//! Two sinks: the in-memory [`Logger`] shown by the log viewer dialog, and an
//! optional `fern` dispatch writing `log` records to `taskdeck.log` in the data
//! directory. Entries written through [`Logger::log`] go to both.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use chrono::Local;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Maximum number of entries kept in memory
const MAX_ENTRIES: usize = 1000;

static FILE_LOGGING: OnceCell<PathBuf> = OnceCell::new();

/// Shared logger that can be used across the application
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<Vec<String>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Build the in-memory logger and, when enabled, start file logging in `data_dir`.
    ///
    /// File logging can only be installed once per process; later calls reuse it.
    pub fn from_config(config: &LoggingConfig, data_dir: &Path) -> Result<Self> {
        if config.enabled {
            init_file_logging(data_dir, config.level_filter())?;
        }
        Ok(Self::new())
    }

    /// Add a log entry
    pub fn log(&self, message: String) {
        log::info!("{}", message);

        let timestamp = Local::now().format("%H:%M:%S%.3f").to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);

        if let Ok(mut logs) = self.logs.lock() {
            logs.push(formatted_message);
            if logs.len() > MAX_ENTRIES {
                let overflow = logs.len() - MAX_ENTRIES;
                logs.drain(..overflow);
            }
        }
    }

    /// Get all logs, newest first
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.logs.lock().map(|logs| logs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Route `log` records to `<data_dir>/taskdeck.log`.
///
/// Returns the log file path. Calling it again returns the path chosen first.
pub fn init_file_logging(data_dir: &Path, level: log::LevelFilter) -> Result<PathBuf> {
    FILE_LOGGING
        .get_or_try_init(|| {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
            let path = data_dir.join("taskdeck.log");
            let file = fern::log_file(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} [{}] {}",
                        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .level(level)
                // Keep dependency chatter out of the file
                .level_for("sqlx", log::LevelFilter::Warn)
                .level_for("hyper", log::LevelFilter::Warn)
                .level_for("rustls", log::LevelFilter::Warn)
                .level_for("tungstenite", log::LevelFilter::Warn)
                .chain(file)
                .apply()
                .context("Failed to install logger")?;

            Ok(path)
        })
        .cloned()
}
