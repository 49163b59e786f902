use proxyvault_domain::shared::{DomainError, ErrorCode, ErrorSeverity};
use serde::{Deserialize, Serialize};

/// Structured error reported by CLI commands
///
/// - Error code for scripts
/// - Human-readable message
/// - Severity level
/// - Recoverability flag (the user can fix the input and retry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    /// Numeric error code (2xxx-6xxx range)
    pub code: u16,

    /// Human-readable error message
    pub message: String,

    /// Error severity level
    pub severity: ErrorSeverity,

    /// Whether the operation can be retried
    pub recoverable: bool,
}

impl CommandError {
    /// Create an error from an error code and message
    pub fn from_code(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: error_code.code(),
            message: message.into(),
            severity: error_code.severity(),
            recoverable: error_code.is_recoverable(),
        }
    }

    /// Terminal or filesystem failure outside the store
    pub fn io(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::StorageError, message)
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self.severity {
            ErrorSeverity::Info | ErrorSeverity::Warning => 1,
            ErrorSeverity::Error => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        Self {
            code: err.code().code(),
            message: err.message().to_string(),
            severity: err.severity(),
            recoverable: err.is_recoverable(),
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_from_domain_error() {
        let domain_err = DomainError::Validation("Proxy host cannot be empty".to_string());
        let cmd_err: CommandError = domain_err.into();

        assert_eq!(cmd_err.code, 6001);
        assert_eq!(cmd_err.message, "Proxy host cannot be empty");
        assert_eq!(cmd_err.severity, ErrorSeverity::Info);
        assert!(cmd_err.recoverable);
        assert_eq!(cmd_err.to_string(), "[6001] Proxy host cannot be empty");
    }

    #[test]
    fn test_missing_editor_is_critical() {
        let cmd_err: CommandError =
            DomainError::NoImplementationAvailable("proxy.settings-editor".to_string()).into();

        assert_eq!(cmd_err.code, 5005);
        assert_eq!(cmd_err.exit_code(), 3);
        assert!(!cmd_err.recoverable);
    }

    #[test]
    fn test_command_error_helpers() {
        let validation_err = CommandError::from_code(ErrorCode::ValidationError, "Invalid input");
        assert_eq!(validation_err.code, 6001);
        assert_eq!(validation_err.exit_code(), 1);

        let io_err: CommandError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into();
        assert_eq!(io_err.code, 4001);
        assert_eq!(io_err.exit_code(), 2);
    }
}
