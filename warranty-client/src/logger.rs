//! Logging Infrastructure
//!
//! Structured logging setup. `RUST_LOG` wins over the configured level when
//! set. Initialisation is idempotent: a second call is a no-op and returns
//! `false`.

use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::ClientConfig;

/// Prefix of daily rolling log files
pub const LOG_FILE_PREFIX: &str = "warranty-pro";

/// Initialize the logger
pub fn init_logger() -> bool {
    init_logger_with_file(None, None)
}

/// Initialize the logger from client configuration
pub fn init_from_config(config: &ClientConfig) -> bool {
    init_logger_with_file(config.log_level.as_deref(), config.log_dir.as_deref())
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> bool {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, LOG_FILE_PREFIX);
            return subscriber
                .with_ansi(false)
                .with_writer(file_appender)
                .try_init()
                .is_ok();
        }
        let installed = subscriber.try_init().is_ok();
        tracing::warn!(log_dir = %dir, "Log directory does not exist, logging to stdout");
        return installed;
    }

    subscriber.try_init().is_ok()
}
