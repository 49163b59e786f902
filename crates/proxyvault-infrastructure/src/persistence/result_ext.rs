use std::io;

use proxyvault_domain::shared::DomainError;

/// Maps filesystem errors onto the store's error kinds
pub trait ResultExt<T> {
    /// Reading: a missing file is `NotFound`, anything else is `Io`
    fn map_load_error(self, context: &str) -> Result<T, DomainError>;

    /// Writing: every failure is `Io`
    fn map_store_error(self, context: &str) -> Result<T, DomainError>;
}

impl<T> ResultExt<T> for Result<T, io::Error> {
    fn map_load_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DomainError::NotFound(format!("{}: {}", context, e)),
            _ => DomainError::Io(format!("{}: {}", context, e)),
        })
    }

    fn map_store_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Io(format!("{}: {}", context, e)))
    }
}
