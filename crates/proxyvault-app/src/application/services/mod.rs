mod config_service;
mod proxy_config_service;
mod proxy_settings_session;

#[cfg(test)]
pub(crate) mod mocks;

pub use config_service::{
    AppConfig, ConfigService, LogLevel, ENV_CIPHER, ENV_LOG_LEVEL, ENV_STORE_PATH,
};
pub use proxy_config_service::{ProxyConfigService, RestoreOutcome, UpdateOutcome};
pub use proxy_settings_session::{
    ConfirmReport, OpenReport, ProxySettingsSession, SessionState,
};
