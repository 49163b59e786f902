use std::path::Path;
use std::sync::Arc;

use crate::application::services::{AppConfig, ProxyConfigService, ProxySettingsSession};
use proxyvault_domain::plugins::ImplementationResolver;
use proxyvault_domain::proxy_config::ProxySettingsEditorFactory;
use proxyvault_infrastructure::http::ProcessProxyApplier;
use proxyvault_infrastructure::persistence::FileProxyConfigRepository;

/// Everything a command needs, built once per process by `AppState::new`
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<FileProxyConfigRepository>,
    pub applier: Arc<ProcessProxyApplier>,
    pub proxy_config: ProxyConfigService,
    pub editor_resolver: ImplementationResolver<dyn ProxySettingsEditorFactory>,
}

impl AppState {
    pub fn store_path(&self) -> &Path {
        self.repository.path()
    }

    /// Fresh Idle session over the shared store and applier
    pub fn new_session(&self) -> ProxySettingsSession {
        ProxySettingsSession::new(self.repository.clone(), self.applier.clone())
    }
}
