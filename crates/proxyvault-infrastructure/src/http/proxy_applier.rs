use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::Proxy;
use tracing::{debug, info};

use proxyvault_domain::proxy_config::{ProxyApplier, ProxyEndpoint};
use proxyvault_domain::shared::DomainError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

struct ActiveProxy {
    endpoint: ProxyEndpoint,
    proxy: Proxy,
}

/// Process-wide proxy for outbound HTTP
///
/// Holds the proxy currently in effect. Clients built through
/// `client_builder` route through it, and ignore environment proxy variables
/// when none is active.
#[derive(Default)]
pub struct ProcessProxyApplier {
    active: RwLock<Option<ActiveProxy>>,
}

impl ProcessProxyApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint currently in effect
    pub fn active_endpoint(&self) -> Option<ProxyEndpoint> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.endpoint.clone())
    }

    /// Client builder routed through the active proxy
    pub fn client_builder(&self) -> ClientBuilder {
        let builder = Client::builder().timeout(REQUEST_TIMEOUT).gzip(true).no_proxy();

        match self.active.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(active) => {
                debug!("🌐 Building client through proxy: {}", active.endpoint.url());
                builder.proxy(active.proxy.clone())
            }
            None => builder,
        }
    }

    fn build_proxy(endpoint: &ProxyEndpoint) -> Result<Proxy, DomainError> {
        if endpoint.host.trim().is_empty() {
            return Err(DomainError::ApplyFailure(
                "Proxy host cannot be empty".to_string(),
            ));
        }
        if endpoint.port == 0 {
            return Err(DomainError::ApplyFailure(
                "Proxy port must be between 1 and 65535".to_string(),
            ));
        }

        let proxy = Proxy::all(endpoint.url()).map_err(|e| {
            DomainError::ApplyFailure(format!("Invalid proxy '{}': {}", endpoint.url(), e))
        })?;

        Ok(match &endpoint.credentials {
            Some(credentials) => proxy.basic_auth(&credentials.username, &credentials.password),
            None => proxy,
        })
    }
}

impl ProxyApplier for ProcessProxyApplier {
    fn apply(&self, endpoint: &ProxyEndpoint) -> Result<(), DomainError> {
        let proxy = Self::build_proxy(endpoint)?;

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(ActiveProxy {
            endpoint: endpoint.clone(),
            proxy,
        });

        info!(
            host = %endpoint.host,
            port = endpoint.port,
            authenticated = endpoint.credentials.is_some(),
            "✓ Proxy applied"
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if previous.is_some() {
            info!("Proxy removed");
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
