use std::fmt;

use super::applier::{ProxyCredentials, ProxyEndpoint};
use super::editor::ProxySettingsEditor;
use crate::shared::DomainError;

/// Proxy configuration aggregate
///
/// The single global proxy setting of the host application. The password is
/// held in plaintext in memory; it is encrypted only by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    enabled: bool,
    host: String,
    port: u16,
    requires_authentication: bool,
    username: Option<String>,
    password: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::new(),
            port: 0,
            requires_authentication: true,
            username: None,
            password: None,
        }
    }
}

impl ProxyConfig {
    /// Create an enabled proxy that answers authentication challenges
    pub fn with_credentials(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::builder()
            .enabled(true)
            .host(host)
            .port(port)
            .requires_authentication(true)
            .username(Some(username.into()))
            .password(Some(password.into()))
            .build()
    }

    /// Create an enabled proxy without authentication
    pub fn without_authentication(host: impl Into<String>, port: u16) -> Self {
        Self::builder()
            .enabled(true)
            .host(host)
            .port(port)
            .requires_authentication(false)
            .build()
    }

    /// Builder for restoring from persistence
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder {
            config: ProxyConfig::default(),
        }
    }

    // Getters
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn requires_authentication(&self) -> bool {
        self.requires_authentication
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    // Setters
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn set_requires_authentication(&mut self, requires_authentication: bool) {
        self.requires_authentication = requires_authentication;
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = non_empty(username);
    }

    pub fn set_password(&mut self, password: Option<String>) {
        self.password = non_empty(password);
    }

    /// Check the field constraints that must hold before the config is applied
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.enabled {
            return Ok(());
        }

        if self.host.trim().is_empty() {
            return Err(DomainError::Validation(
                "Proxy host cannot be empty when enabled".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(DomainError::Validation(
                "Proxy port must be between 1 and 65535 when enabled".to_string(),
            ));
        }

        if self.requires_authentication {
            if self.username.is_none() {
                return Err(DomainError::Validation(
                    "Proxy username is required when authentication is enabled".to_string(),
                ));
            }

            if self.password.is_none() {
                return Err(DomainError::Validation(
                    "Proxy password is required when authentication is enabled".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Endpoint handed to the network layer, None when the proxy is disabled
    pub fn endpoint(&self) -> Option<ProxyEndpoint> {
        if !self.enabled {
            return None;
        }

        let credentials = if self.requires_authentication {
            Some(ProxyCredentials {
                username: self.username.clone().unwrap_or_default(),
                password: self.password.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        Some(ProxyEndpoint {
            host: self.host.trim().to_string(),
            port: self.port,
            credentials,
        })
    }

    /// Get proxy URL if enabled, None otherwise
    pub fn proxy_url(&self) -> Option<String> {
        self.endpoint().map(|endpoint| endpoint.url())
    }

    /// Copy without credentials when authentication is not required
    pub fn minimized(&self) -> Self {
        let mut config = self.clone();
        if !config.requires_authentication {
            config.username = None;
            config.password = None;
        }
        config
    }

    /// Read the current field values out of an editor
    pub fn from_editor(editor: &dyn ProxySettingsEditor) -> Self {
        Self::builder()
            .enabled(editor.enabled())
            .host(editor.host())
            .port(editor.port())
            .requires_authentication(editor.requires_authentication())
            .username(editor.username())
            .password(editor.password())
            .build()
    }

    /// Populate an editor with this configuration
    pub fn write_to(&self, editor: &mut dyn ProxySettingsEditor) {
        editor.set_enabled(self.enabled);
        editor.set_host(&self.host);
        editor.set_port(self.port);
        editor.set_requires_authentication(self.requires_authentication);
        editor.set_username(self.username.as_deref());
        editor.set_password(self.password.as_deref());
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("requires_authentication", &self.requires_authentication)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "REDACTED"))
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Builder for ProxyConfig (used when restoring from the store)
pub struct ProxyConfigBuilder {
    config: ProxyConfig,
}

impl ProxyConfigBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn requires_authentication(mut self, requires_authentication: bool) -> Self {
        self.config.requires_authentication = requires_authentication;
        self
    }

    pub fn username(mut self, username: Option<String>) -> Self {
        self.config.set_username(username);
        self
    }

    pub fn password(mut self, password: Option<String>) -> Self {
        self.config.set_password(password);
        self
    }

    pub fn build(self) -> ProxyConfig {
        self.config
    }
}
