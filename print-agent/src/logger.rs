//! Logging Infrastructure
//!
//! tracing subscriber setup with optional daily-rolling file output in the
//! agent log directory. Old log files are pruned, keeping the last 7 days.

use std::path::{Path, PathBuf};

const MAX_LOG_FILES: usize = 7;
const LOG_PREFIX: &str = "print-agent";

/// Initialize the logger
///
/// With a log directory the subscriber writes daily-rolling files there;
/// otherwise it logs to stdout only.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&Path>) {
    let level = log_level.unwrap_or("info");

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir
        && std::fs::create_dir_all(dir).is_ok()
        && let Some(dir_str) = dir.to_str()
    {
        let file_appender = tracing_appender::rolling::daily(dir_str, LOG_PREFIX);
        subscriber.with_writer(file_appender).init();
        return;
    }

    subscriber.init();
}

/// Remove daily log files beyond the retention window
pub fn cleanup_old_logs(log_dir: &Path) -> std::io::Result<()> {
    let mut logs: Vec<PathBuf> = std::fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_PREFIX))
        })
        .collect();

    // Daily file names sort chronologically (prefix.YYYY-MM-DD)
    logs.sort();
    while logs.len() > MAX_LOG_FILES {
        let oldest = logs.remove(0);
        let _ = std::fs::remove_file(&oldest);
    }
    Ok(())
}
