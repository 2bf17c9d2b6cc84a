//! Status codes and error handling
//!
//! Every failure in the engine maps to a numeric status code. Callers that
//! only need a yes/no answer (remove, replace, search) get `bool`/`Option`;
//! everything that can fail for more than one reason returns a
//! [`DeskResult`].

use thiserror::Error;

/// Engine status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    /// Zero-length push or pop
    InvalidLength = 1,
    /// Byte queue has no room for the pushed bytes
    QueueFull = 2,
    /// Byte queue has fewer unread bytes than requested
    QueueEmpty = 3,
    /// Key already present and duplicates not allowed
    DuplicateKey = 4,
    /// Key value not found
    KeyNotFound = 5,
    /// Handle refers to a removed node
    InvalidHandle = 6,
    /// File not open
    FileNotOpen = 7,
    /// File not found
    FileNotFound = 8,
    /// I/O error occurred
    IoError = 9,
    /// Record bytes do not decode
    InvalidFormat = 10,
    /// Record length prefix above the accepted maximum
    RecordTooLarge = 11,
    /// Buffer allocation failed
    OutOfMemory = 12,
    /// Field value outside its accepted range
    InvalidValue = 13,
}

impl StatusCode {
    /// Get the raw status code value
    pub fn as_raw(&self) -> u16 {
        *self as u16
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_raw(), match self {
            StatusCode::InvalidLength => "Invalid length",
            StatusCode::QueueFull => "Byte queue full",
            StatusCode::QueueEmpty => "Byte queue empty",
            StatusCode::DuplicateKey => "Duplicate key value",
            StatusCode::KeyNotFound => "Key value not found",
            StatusCode::InvalidHandle => "Stale record handle",
            StatusCode::FileNotOpen => "File not open",
            StatusCode::FileNotFound => "File not found",
            StatusCode::IoError => "I/O error",
            StatusCode::InvalidFormat => "Invalid record format",
            StatusCode::RecordTooLarge => "Record too large",
            StatusCode::OutOfMemory => "Out of memory",
            StatusCode::InvalidValue => "Invalid field value",
        })
    }
}

/// Main error type for the gymdesk engine
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("status {0}")]
    Status(StatusCode),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl DeskError {
    /// Get the status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeskError::Status(code) => *code,
            DeskError::Io(_) => StatusCode::IoError,
            DeskError::InvalidFormat(_) => StatusCode::InvalidFormat,
            DeskError::InvalidValue(_) => StatusCode::InvalidValue,
        }
    }
}

impl From<std::io::Error> for DeskError {
    /// Engine errors raised under an `io::Write`/`io::Read` impl come back
    /// as themselves
    fn from(err: std::io::Error) -> Self {
        match err.downcast::<DeskError>() {
            Ok(inner) => inner,
            Err(err) => DeskError::Io(err),
        }
    }
}

impl From<StatusCode> for DeskError {
    fn from(code: StatusCode) -> Self {
        DeskError::Status(code)
    }
}

/// Result type for engine operations
pub type DeskResult<T> = Result<T, DeskError>;
