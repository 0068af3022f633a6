use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit code for input, platform and log file problems.
pub const USAGE_EXIT_CODE: u8 = 2;

/// Exit code when the ping executable could not be started.
pub const SPAWN_FAILED_EXIT_CODE: i32 = 127;

/// Exit code when the run was cut short by a signal.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Error)]
pub enum PingError {
    /// Bad target, count or interval. Raised before anything is spawned.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Host OS has no known ping dialect.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("cannot open log file {}: {source}", path.display())]
    LogOpen { path: PathBuf, source: io::Error },

    #[error("failed to start {executable}: {source}")]
    SpawnFailed { executable: String, source: io::Error },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl PingError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PingError::InvalidArgument(msg.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            PingError::SpawnFailed { .. } => SPAWN_FAILED_EXIT_CODE as u8,
            PingError::InvalidArgument(_)
            | PingError::UnsupportedPlatform(_)
            | PingError::LogOpen { .. }
            | PingError::Io(_) => USAGE_EXIT_CODE,
        }
    }
}
