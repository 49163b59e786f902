use serde::{Deserialize, Serialize};

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    ConfigNotFound = 2001,

    // Data & Persistence (4xxx)
    StorageError = 4001,
    DataIntegrityError = 4003,
    EncryptionError = 4005,

    // Infrastructure (5xxx)
    ApplyFailed = 5002,
    NetworkError = 5003,
    NoImplementationAvailable = 5005,
    InvalidState = 5006,

    // Validation (6xxx)
    ValidationError = 6001,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::ConfigNotFound | ErrorCode::ValidationError => ErrorSeverity::Info,

            ErrorCode::ApplyFailed | ErrorCode::NetworkError | ErrorCode::InvalidState => {
                ErrorSeverity::Warning
            }

            ErrorCode::StorageError
            | ErrorCode::DataIntegrityError
            | ErrorCode::EncryptionError => ErrorSeverity::Error,

            ErrorCode::NoImplementationAvailable => ErrorSeverity::Critical,
        }
    }

    /// Check if the user can fix the input and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationError
                | ErrorCode::ApplyFailed
                | ErrorCode::NetworkError
                | ErrorCode::StorageError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// No stored configuration yet. Expected on first run.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store exists but a field is missing, unparseable or undecryptable.
    #[error("Corrupt configuration: {0}")]
    Corrupt(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No implementation available: {0}")]
    NoImplementationAvailable(String),

    #[error("Failed to apply proxy: {0}")]
    ApplyFailure(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::NotFound(_) => ErrorCode::ConfigNotFound,
            DomainError::Corrupt(_) => ErrorCode::DataIntegrityError,
            DomainError::Io(_) => ErrorCode::StorageError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::NoImplementationAvailable(_) => ErrorCode::NoImplementationAvailable,
            DomainError::ApplyFailure(_) => ErrorCode::ApplyFailed,
            DomainError::Encryption(_) => ErrorCode::EncryptionError,
            DomainError::InvalidState(_) => ErrorCode::InvalidState,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::NotFound(msg)
            | DomainError::Corrupt(msg)
            | DomainError::Io(msg)
            | DomainError::Validation(msg)
            | DomainError::NoImplementationAvailable(msg)
            | DomainError::ApplyFailure(msg)
            | DomainError::Encryption(msg)
            | DomainError::InvalidState(msg) => msg,
        }
    }

    /// A missing store is the only failure callers treat as "use defaults".
    pub fn is_benign(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
