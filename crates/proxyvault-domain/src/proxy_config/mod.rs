mod applier;
mod config;
mod editor;
mod repository;

pub use applier::{ProxyApplier, ProxyCredentials, ProxyEndpoint};
pub use config::{ProxyConfig, ProxyConfigBuilder};
pub use editor::{ProxySettingsEditor, ProxySettingsEditorFactory, SETTINGS_EDITOR_ROLE};
pub use repository::ProxyConfigRepository;
