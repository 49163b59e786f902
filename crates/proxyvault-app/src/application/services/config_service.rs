use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use proxyvault_infrastructure::config::default_store_path;
use proxyvault_infrastructure::security::CipherScheme;

pub const ENV_STORE_PATH: &str = "PROXYVAULT_STORE_PATH";
pub const ENV_CIPHER: &str = "PROXYVAULT_CIPHER";
pub const ENV_LOG_LEVEL: &str = "PROXYVAULT_LOG_LEVEL";

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "Invalid log level: {other}. Must be one of error, warn, info, debug, trace"
            )),
        }
    }
}

/// Persistent configuration structure (`app_config.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// Store location; the default path when unset
    pub store_path: Option<PathBuf>,
    pub cipher: CipherScheme,
}

impl AppConfig {
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(default_store_path)
    }
}

/// Application configuration service
///
/// Layers, later wins: defaults, `app_config.json`, environment variables.
/// Command-line flags are applied by the caller on top. Loading happens
/// before logging is up, so problems are kept and logged by `report`.
pub struct ConfigService {
    config: AppConfig,
    config_path: PathBuf,
    loaded_from_file: bool,
    warnings: Vec<String>,
}

impl ConfigService {
    /// Load from `config_path` and the process environment
    pub fn load(config_path: impl Into<PathBuf>) -> Self {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Load from `config_path`, reading overrides through `lookup`
    pub fn load_with_env<F>(config_path: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = config_path.into();
        let mut warnings = Vec::new();

        let file_config = read_config_file(&config_path, &mut warnings);
        let loaded_from_file = file_config.is_some();
        let mut config = file_config.unwrap_or_default();
        apply_env_overrides(&mut config, lookup, &mut warnings);

        Self {
            config,
            config_path,
            loaded_from_file,
            warnings,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Log where the configuration came from and what was ignored
    pub fn report(&self) {
        if self.loaded_from_file {
            info!("📁 Config loaded from: {:?}", self.config_path);
        } else {
            debug!("No usable config at {:?}, using defaults", self.config_path);
        }
        for warning in &self.warnings {
            warn!("⚠️  {}", warning);
        }
    }
}

fn read_config_file(path: &Path, warnings: &mut Vec<String>) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warnings.push(format!("Cannot read {}: {}. Using defaults", path.display(), e));
            return None;
        }
    };

    match serde_json::from_str::<AppConfig>(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warnings.push(format!(
                "Invalid config in {}: {}. Using defaults",
                path.display(),
                e
            ));
            None
        }
    }
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F, warnings: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_STORE_PATH).filter(|p| !p.trim().is_empty()) {
        config.store_path = Some(PathBuf::from(path));
    }

    if let Some(value) = lookup(ENV_CIPHER) {
        match value.parse::<CipherScheme>() {
            Ok(cipher) => config.cipher = cipher,
            Err(e) => warnings.push(format!("Ignoring {}: {}", ENV_CIPHER, e)),
        }
    }

    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        match value.parse::<LogLevel>() {
            Ok(level) => config.log_level = level,
            Err(e) => warnings.push(format!("Ignoring {}: {}", ENV_LOG_LEVEL, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_string() {
        assert_eq!(LogLevel::Error.as_str(), "error");
        assert_eq!(LogLevel::Info.as_str(), "info");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::load_with_env(dir.path().join("app_config.json"), no_env);

        assert_eq!(service.config(), &AppConfig::default());
        assert!(service.warnings.is_empty());
        assert_eq!(service.config().cipher, CipherScheme::Authenticated);
        assert!(service
            .config()
            .resolved_store_path()
            .ends_with("proxy.properties"));
    }

    #[test]
    fn test_file_values_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_config.json");
        std::fs::write(
            &path,
            r#"{ "log_level": "debug", "store_path": "/srv/proxy.properties", "cipher": "legacy" }"#,
        )
        .unwrap();

        let config = ConfigService::load_with_env(&path, no_env).config().clone();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.cipher, CipherScheme::Legacy);
        assert_eq!(
            config.resolved_store_path(),
            PathBuf::from("/srv/proxy.properties")
        );
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_config.json");
        std::fs::write(&path, r#"{ "log_level": "warn" }"#).unwrap();

        let config = ConfigService::load_with_env(&path, no_env).config().clone();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.store_path, None);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let service = ConfigService::load_with_env(&path, no_env);
        assert_eq!(service.config(), &AppConfig::default());
        assert_eq!(service.warnings.len(), 1);
        assert!(service.warnings[0].starts_with("Invalid config in"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_config.json");
        std::fs::write(&path, r#"{ "log_level": "debug", "cipher": "legacy" }"#).unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_STORE_PATH, "/tmp/other.properties"),
            (ENV_CIPHER, "gcm"),
            (ENV_LOG_LEVEL, "nonsense"),
        ]
        .into_iter()
        .collect();

        let service = ConfigService::load_with_env(&path, |key| {
            env.get(key).map(|value| value.to_string())
        });
        let config = service.config();

        assert_eq!(config.cipher, CipherScheme::Authenticated);
        assert_eq!(
            config.store_path,
            Some(PathBuf::from("/tmp/other.properties"))
        );
        // Invalid values are ignored and kept for the log
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(service.warnings.len(), 1);
        assert!(service.warnings[0].contains(ENV_LOG_LEVEL));
    }
}
