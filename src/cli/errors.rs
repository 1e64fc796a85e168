//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::connection::ConnectError;
use crate::store::StoreError;
use crate::view::ViewError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or flag error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Session could not be established
    ConnectFailed,
    /// A store or view operation failed
    QueryFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AAEW_CLI_CONFIG_ERROR",
            Self::IoError => "AAEW_CLI_IO_ERROR",
            Self::ConnectFailed => "AAEW_CLI_CONNECT_FAILED",
            Self::QueryFailed => "AAEW_CLI_QUERY_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConnectError> for CliError {
    fn from(e: ConnectError) -> Self {
        let code = if e.is_configuration() {
            CliErrorCode::ConfigError
        } else {
            CliErrorCode::ConnectFailed
        };
        Self::new(code, e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::QueryFailed, e.to_string())
    }
}

impl From<ViewError> for CliError {
    fn from(e: ViewError) -> Self {
        Self::new(CliErrorCode::QueryFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_connect_error_mapping() {
        let err: CliError = ConnectError::AuthFileNotFound(PathBuf::from("auth.json")).into();
        assert_eq!(err.code(), CliErrorCode::ConfigError);

        let err: CliError = ConnectError::ConnectionFailed {
            url: "http://x".to_string(),
            cause: StoreError::transport("refused"),
        }
        .into();
        assert_eq!(err.code(), CliErrorCode::ConnectFailed);
        assert!(err.to_string().starts_with("AAEW_CLI_CONNECT_FAILED"));
    }
}
