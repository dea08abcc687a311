use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

/// Set up application logging based on configuration
///
/// Logs go to stderr unless `logging.file_path` is set. The returned guard must
/// be kept alive until exit so buffered file output is flushed.
pub fn setup_logging(config: &Config) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    match config.log_file_path() {
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .finish();

            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                eprintln!("Failed to set global tracing subscriber: {}", e);
            }
            None
        }
        Some(path) => {
            let (file_writer, guard) = match create_file_logger(path) {
                Ok(writer) => writer,
                Err(e) => {
                    eprintln!("Failed to open log file {}: {}. Logging to stderr.", path, e);
                    let subscriber = FmtSubscriber::builder()
                        .with_env_filter(env_filter)
                        .with_writer(std::io::stderr)
                        .finish();
                    let _ = tracing::subscriber::set_global_default(subscriber);
                    return None;
                }
            };

            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(file_writer)
                .with_ansi(false)
                .finish();

            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                eprintln!("Failed to set global tracing subscriber: {}", e);
            }
            Some(guard)
        }
    }
}

// Create file logger
fn create_file_logger(path: &str) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    let log_path = std::path::PathBuf::from(path);
    let log_dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    std::fs::create_dir_all(&log_dir)?;

    let log_file_name = log_path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("alice-tokens.log"));

    // Single invocation per process, so no rotation.
    let file_appender = tracing_appender::rolling::never(&log_dir, log_file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_file_logger_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("alice-tokens.log");

        let result = create_file_logger(path.to_str().unwrap());
        assert!(result.is_ok());
        assert!(dir.path().join("logs").is_dir());
    }
}
