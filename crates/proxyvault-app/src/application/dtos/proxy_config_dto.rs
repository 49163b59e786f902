use serde::{Deserialize, Serialize};

use proxyvault_domain::proxy_config::ProxyConfig;

/// Proxy configuration as shown to users. The password never leaves the
/// service; only its presence is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfigDto {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub requires_authentication: bool,
    pub username: Option<String>,
    pub has_password: bool,
}

impl From<&ProxyConfig> for ProxyConfigDto {
    fn from(config: &ProxyConfig) -> Self {
        Self {
            enabled: config.is_enabled(),
            host: config.host().to_string(),
            port: config.port(),
            requires_authentication: config.requires_authentication(),
            username: config.username().map(str::to_string),
            has_password: config.password().is_some(),
        }
    }
}

/// Input for replacing the proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProxyConfigInput {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub requires_authentication: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateProxyConfigInput {
    pub fn to_config(&self) -> ProxyConfig {
        ProxyConfig::builder()
            .enabled(self.enabled)
            .host(self.host.trim())
            .port(self.port)
            .requires_authentication(self.requires_authentication)
            .username(self.username.clone())
            .password(self.password.clone())
            .build()
    }
}
