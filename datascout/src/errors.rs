/// Error types shared by the search and mean-calculation pipelines.
///
/// # Severity
///
/// Only a missing root directory aborts an operation. Every other error is
/// scoped to one file: the pipelines log it, report the file as skipped and
/// continue with the next one.
/// ```rust,ignore
/// match datascout::list_files(&config) {
///     Ok(files) => // scan them,
///     Err(ScanError::DirectoryNotFound(dir)) => // nothing to do,
///     Err(e) => // propagate
/// }
/// ```
///
/// Record-level failures (a CSV cell that is not a number, a JSON item without
/// the requested key) never surface as a `ScanError`; those records are
/// skipped silently.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning a directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
}

impl ScanError {
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn invalid_condition(condition: impl Into<String>) -> Self {
        Self::InvalidCondition(condition.into())
    }

    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat(path.into())
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    /// Maps an I/O error raised while opening `path` onto the matching variant
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}
