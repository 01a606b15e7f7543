// Error types - some variants for future error conditions

#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Terminal initialization failed: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration directory could not be resolved")]
    ConfigDirUnavailable,

    #[error("Log file error: {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, SetupError>;
