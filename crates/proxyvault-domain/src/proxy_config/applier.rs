use std::fmt;

use crate::shared::DomainError;

/// Username and password answered to proxy authentication challenges
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"REDACTED")
            .finish()
    }
}

/// Where outbound traffic should be routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub credentials: Option<ProxyCredentials>,
}

impl ProxyEndpoint {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Network-layer collaborator that makes a proxy take effect for the process
pub trait ProxyApplier: Send + Sync {
    /// Route outbound connections through `endpoint`
    fn apply(&self, endpoint: &ProxyEndpoint) -> Result<(), DomainError>;

    /// Remove any proxy previously applied
    fn clear(&self) -> Result<(), DomainError>;

    /// Whether a proxy is currently in effect
    fn is_active(&self) -> bool;
}
