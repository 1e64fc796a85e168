//! View error types
//!
//! Error codes:
//! - AAEW_VIEW_CANNOT_EXECUTE (ERROR): the store rejected an ad-hoc view
//! - AAEW_VIEW_OUT_OF_MEMORY (ERROR): no window small enough to fetch a page
//! - AAEW_VIEW_INVALID_FIELD (ERROR): bad field path for a view template
//! - AAEW_VIEW_STORE (ERROR): any other store failure, passed through

use std::fmt;

use crate::store::StoreError;

/// View-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewErrorCode {
    /// Server cannot execute view
    CannotExecute,
    /// Memory exhausted at the smallest window
    OutOfMemory,
    /// Field path does not start at `doc`
    InvalidField,
    /// Store failure not specific to views
    Store,
}

impl ViewErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ViewErrorCode::CannotExecute => "AAEW_VIEW_CANNOT_EXECUTE",
            ViewErrorCode::OutOfMemory => "AAEW_VIEW_OUT_OF_MEMORY",
            ViewErrorCode::InvalidField => "AAEW_VIEW_INVALID_FIELD",
            ViewErrorCode::Store => "AAEW_VIEW_STORE",
        }
    }
}

impl fmt::Display for ViewErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// View error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    code: ViewErrorCode,
    message: String,
    source: Option<StoreError>,
}

impl ViewError {
    /// The store cannot execute the ad-hoc view
    pub fn cannot_execute(source: StoreError) -> Self {
        Self {
            code: ViewErrorCode::CannotExecute,
            message: "server cannot execute view".to_string(),
            source: Some(source),
        }
    }

    /// Out of memory with the window already at its floor
    pub fn out_of_memory(window_size: usize, source: StoreError) -> Self {
        Self {
            code: ViewErrorCode::OutOfMemory,
            message: format!("out of memory at window size {}", window_size),
            source: Some(source),
        }
    }

    /// Invalid template field path
    pub fn invalid_field(field: &str) -> Self {
        Self {
            code: ViewErrorCode::InvalidField,
            message: format!("field path '{}' must start with 'doc'", field),
            source: None,
        }
    }

    /// Any other store failure
    pub fn store(source: StoreError) -> Self {
        Self {
            code: ViewErrorCode::Store,
            message: source.message().to_string(),
            source: Some(source),
        }
    }

    pub fn code(&self) -> ViewErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying store error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        self.source.as_ref()
    }
}

impl From<StoreError> for ViewError {
    fn from(e: StoreError) -> Self {
        Self::store(e)
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for view operations
pub type ViewResult<T> = Result<T, ViewError>;
