//! File-backed tracing setup - the terminal belongs to the UI

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, SetupError};

/// Route tracing output to `log_path`. The returned guard must stay alive for
/// the process lifetime or buffered lines are lost.
pub fn init(log_path: &Path) -> Result<WorkerGuard> {
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| SetupError::Config(format!("invalid log path: {}", log_path.display())))?;

    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| SetupError::LogFile {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!("eleven-setup starting up");
    Ok(guard)
}
