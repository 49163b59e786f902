use super::ProxyConfig;
use crate::shared::DomainError;

/// Proxy configuration repository trait
///
/// One repository owns one store location. `load` fails with
/// `DomainError::NotFound` when nothing has been stored yet.
pub trait ProxyConfigRepository: Send + Sync {
    /// Get the proxy configuration (singleton)
    fn load(&self) -> Result<ProxyConfig, DomainError>;

    /// Save the proxy configuration
    fn store(&self, config: &ProxyConfig) -> Result<(), DomainError>;
}
