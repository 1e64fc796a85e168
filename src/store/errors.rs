//! Store error types
//!
//! Error codes:
//! - AAEW_STORE_NOT_FOUND (ERROR)
//! - AAEW_STORE_UNAUTHORIZED (ERROR)
//! - AAEW_STORE_SERVER_ERROR (ERROR)
//! - AAEW_STORE_OUT_OF_MEMORY (ERROR, recoverable by smaller pages)
//! - AAEW_STORE_TRANSPORT (ERROR)
//! - AAEW_STORE_INVALID_RESPONSE (ERROR)

use std::fmt;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Collection, document or view does not exist
    NotFound,
    /// Missing or rejected credentials
    Unauthorized,
    /// The store refused or failed to execute the request
    ServerError,
    /// The request exhausted memory on either side of the wire
    OutOfMemory,
    /// Connection-level failure
    Transport,
    /// The store answered with something that could not be decoded
    InvalidResponse,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::NotFound => "AAEW_STORE_NOT_FOUND",
            StoreErrorCode::Unauthorized => "AAEW_STORE_UNAUTHORIZED",
            StoreErrorCode::ServerError => "AAEW_STORE_SERVER_ERROR",
            StoreErrorCode::OutOfMemory => "AAEW_STORE_OUT_OF_MEMORY",
            StoreErrorCode::Transport => "AAEW_STORE_TRANSPORT",
            StoreErrorCode::InvalidResponse => "AAEW_STORE_INVALID_RESPONSE",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    /// HTTP status, when the error came off the wire
    status: Option<u16>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    /// Resource does not exist
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::NotFound, what)
    }

    /// Credentials missing or rejected
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Unauthorized, reason)
    }

    /// Store failed to execute the request
    pub fn server_error(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ServerError, reason)
    }

    /// Memory exhausted while producing or receiving a response
    pub fn out_of_memory(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::OutOfMemory, reason)
    }

    /// Connection-level failure
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Transport, reason)
    }

    /// Undecodable response
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InvalidResponse, reason)
    }

    /// Attach the HTTP status the error was derived from
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if any
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Whether a smaller request might succeed
    pub fn is_out_of_memory(&self) -> bool {
        self.code == StoreErrorCode::OutOfMemory
    }

    /// Whether the store could not execute the request as given
    pub fn is_server_error(&self) -> bool {
        self.code == StoreErrorCode::ServerError
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StoreErrorCode::NotFound
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
