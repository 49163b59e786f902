use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::application::services::{AppConfig, ProxyConfigService};
use crate::presentation::editor::{FormEditorFactory, MaskedFormEditorFactory};
use crate::presentation::error::CommandError;
use crate::presentation::state::AppState;
use proxyvault_domain::plugins::{ImplementationRegistry, ImplementationResolver};
use proxyvault_domain::proxy_config::{ProxySettingsEditorFactory, SETTINGS_EDITOR_ROLE};
use proxyvault_domain::shared::ErrorCode;
use proxyvault_infrastructure::http::ProcessProxyApplier;
use proxyvault_infrastructure::persistence::FileProxyConfigRepository;
use proxyvault_infrastructure::security::PasswordProtector;

/// Registry with every settings editor compiled into this binary
pub fn editor_registry() -> Arc<ImplementationRegistry<dyn ProxySettingsEditorFactory>> {
    let registry: Arc<ImplementationRegistry<dyn ProxySettingsEditorFactory>> =
        Arc::new(ImplementationRegistry::new());
    registry.register(SETTINGS_EDITOR_ROLE, Arc::new(FormEditorFactory));
    registry.register(SETTINGS_EDITOR_ROLE, Arc::new(MaskedFormEditorFactory));
    registry
}

impl AppState {
    /// Wire the store, applier and services for `config`
    ///
    /// Fails when no settings editor can be resolved.
    pub fn new(config: AppConfig) -> Result<Self, CommandError> {
        Self::with_editors(config, editor_registry())
    }

    pub fn with_editors(
        config: AppConfig,
        editors: Arc<ImplementationRegistry<dyn ProxySettingsEditorFactory>>,
    ) -> Result<Self, CommandError> {
        let started = Instant::now();

        let protector = PasswordProtector::new(config.cipher)
            .map_err(|e| CommandError::from_code(ErrorCode::EncryptionError, e.to_string()))?;
        let store_path = config.resolved_store_path();
        let repository = Arc::new(FileProxyConfigRepository::new(&store_path, protector));
        let applier = Arc::new(ProcessProxyApplier::new());

        let editor_resolver = ImplementationResolver::new(editors, SETTINGS_EDITOR_ROLE);
        let editor = editor_resolver.resolve().map_err(|e| {
            error!("❌ No settings editor available: {}", e);
            CommandError::from(e)
        })?;

        let proxy_config = ProxyConfigService::new(repository.clone(), applier.clone());

        info!(
            store = %store_path.display(),
            cipher = %config.cipher,
            role = editor_resolver.role(),
            editor = editor.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "✅ App state initialized"
        );

        Ok(Self {
            config,
            repository,
            applier,
            proxy_config,
            editor_resolver,
        })
    }
}
