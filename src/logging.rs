//! File logging. The terminal belongs to the UI, so tracing output goes to a
//! log file through a non-blocking writer.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const LOG_FILE_NAME: &str = "utmgrid.log";

/// Log file location: the configured path, or `utmgrid.log` in the cache dir
pub fn log_path(app_name: &str, config: &LoggingConfig) -> Result<PathBuf> {
    if let Some(file) = &config.file {
        return Ok(file.clone());
    }
    let dir = dirs::cache_dir()
        .ok_or_else(|| eyre!("Could not determine cache directory"))?
        .join(app_name);
    Ok(dir.join(LOG_FILE_NAME))
}

/// `RUST_LOG` wins; otherwise the configured level
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(app_name: &str, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let path = log_path(app_name, config)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(build_filter(&config.level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // A subscriber is already installed; dropping the guard stops our writer
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_log_path_wins() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            file: Some(PathBuf::from("/tmp/custom.log")),
        };
        assert_eq!(
            log_path("utmgrid", &config).unwrap(),
            PathBuf::from("/tmp/custom.log")
        );
    }
}
