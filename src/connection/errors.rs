//! # Connection Errors

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Result type for connection setup
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Failures while establishing a session
#[derive(Debug, Error)]
pub enum ConnectError {
    // ==================
    // Configuration Errors
    // ==================
    /// Auth file does not exist
    #[error("auth file not found: {}", .0.display())]
    AuthFileNotFound(PathBuf),

    /// Auth file exists but cannot be read
    #[error("cannot read auth file {}: {source}", .path.display())]
    AuthFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Auth file is not a `{"user": ..., "pass": ...}` object
    #[error("invalid auth file {}: {source}", .path.display())]
    AuthFileInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ==================
    // Session Errors
    // ==================
    /// Login or version check failed
    #[error("could not login to {url}: {cause}")]
    ConnectionFailed {
        url: String,
        #[source]
        cause: StoreError,
    },
}

impl ConnectError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConnectError::AuthFileNotFound(_) => "AAEW_CONNECT_AUTH_FILE_NOT_FOUND",
            ConnectError::AuthFileUnreadable { .. } => "AAEW_CONNECT_AUTH_FILE_UNREADABLE",
            ConnectError::AuthFileInvalid { .. } => "AAEW_CONNECT_AUTH_FILE_INVALID",
            ConnectError::ConnectionFailed { .. } => "AAEW_CONNECT_FAILED",
        }
    }

    /// Whether this is a local configuration problem rather than a server one
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ConnectError::ConnectionFailed { .. })
    }
}
