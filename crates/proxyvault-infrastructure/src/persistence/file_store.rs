use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::PoisonError;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use proxyvault_domain::proxy_config::{ProxyConfig, ProxyConfigRepository};
use proxyvault_domain::shared::DomainError;

use super::path_lock::lock_for;
use super::properties::Properties;
use super::result_ext::ResultExt;
use crate::security::PasswordProtector;

const KEY_ENABLED: &str = "enabled";
const KEY_HOST: &str = "host";
const KEY_PORT: &str = "port";
const KEY_AUTHENTICATION: &str = "authentication";
const KEY_USERNAME: &str = "username";
const KEY_PASSWORD: &str = "password";

const KNOWN_KEYS: [&str; 6] = [
    KEY_ENABLED,
    KEY_HOST,
    KEY_PORT,
    KEY_AUTHENTICATION,
    KEY_USERNAME,
    KEY_PASSWORD,
];

const STORE_HEADER: &str = "Proxy settings";

/// Property-file implementation of ProxyConfigRepository
///
/// One file holds the single proxy configuration. The password is sealed by
/// the `PasswordProtector` before it reaches the disk; every other field is
/// stored as text.
pub struct FileProxyConfigRepository {
    path: PathBuf,
    protector: PasswordProtector,
}

impl FileProxyConfigRepository {
    pub fn new(path: impl Into<PathBuf>, protector: PasswordProtector) -> Self {
        Self {
            path: path.into(),
            protector,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(&self, properties: &Properties) -> Result<ProxyConfig, DomainError> {
        let host = properties
            .get(KEY_HOST)
            .ok_or_else(|| DomainError::Corrupt(format!("Missing key '{}'", KEY_HOST)))?;

        let port = properties
            .get(KEY_PORT)
            .ok_or_else(|| DomainError::Corrupt(format!("Missing key '{}'", KEY_PORT)))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| DomainError::Corrupt(format!("Invalid port '{}': {}", port, e)))?;

        let enabled = parse_flag(properties.get(KEY_ENABLED));
        let requires_authentication = parse_flag(properties.get(KEY_AUTHENTICATION));

        let mut builder = ProxyConfig::builder()
            .enabled(enabled)
            .host(host)
            .port(port)
            .requires_authentication(requires_authentication);

        if requires_authentication {
            let password = match properties.get(KEY_PASSWORD).filter(|p| !p.is_empty()) {
                Some(sealed) => Some(self.protector.open(sealed).map_err(|e| {
                    DomainError::Corrupt(format!("Stored password cannot be decrypted: {}", e))
                })?),
                None => None,
            };

            builder = builder
                .username(properties.get(KEY_USERNAME).map(str::to_string))
                .password(password);
        }

        Ok(builder.build())
    }

    fn encode(&self, config: &ProxyConfig) -> Result<Properties, DomainError> {
        let mut properties = Properties::new();
        properties.set(KEY_ENABLED, config.is_enabled().to_string());
        properties.set(KEY_HOST, config.host());
        properties.set(KEY_PORT, config.port().to_string());
        properties.set(
            KEY_AUTHENTICATION,
            config.requires_authentication().to_string(),
        );

        if config.requires_authentication() {
            if let Some(username) = config.username() {
                properties.set(KEY_USERNAME, username);
            }
            if let Some(password) = config.password() {
                let sealed = self
                    .protector
                    .seal(password)
                    .map_err(|e| DomainError::Encryption(e.to_string()))?;
                properties.set(KEY_PASSWORD, sealed);
            }
        }

        Ok(properties)
    }

    fn write_atomically(&self, contents: &str) -> Result<(), DomainError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        fs::create_dir_all(parent).map_store_error("Failed to create store directory")?;

        let mut temp =
            NamedTempFile::new_in(parent).map_store_error("Failed to create temporary file")?;
        temp.write_all(contents.as_bytes())
            .map_store_error("Failed to write proxy settings")?;
        temp.as_file()
            .sync_all()
            .map_store_error("Failed to flush proxy settings")?;
        temp.persist(&self.path)
            .map_err(|e| e.error)
            .map_store_error("Failed to replace proxy settings")?;

        Ok(())
    }
}

impl ProxyConfigRepository for FileProxyConfigRepository {
    fn load(&self) -> Result<ProxyConfig, DomainError> {
        let lock = lock_for(&self.path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let bytes = fs::read(&self.path).map_load_error("Failed to read proxy settings")?;
        let text = String::from_utf8(bytes)
            .map_err(|e| DomainError::Corrupt(format!("Store is not valid UTF-8: {}", e)))?;
        let properties = if Properties::is_xml(&text) {
            debug!(path = %self.path.display(), "Reading XML-framed proxy settings");
            Properties::parse_xml(&text)
        } else {
            Properties::parse(&text)
        }
        .map_err(|e| DomainError::Corrupt(e.to_string()))?;

        for (key, _) in properties.iter().filter(|(key, _)| !KNOWN_KEYS.contains(key)) {
            debug!(path = %self.path.display(), key, "Ignoring unknown key in proxy settings");
        }

        let config = self.decode(&properties).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Stored proxy settings are corrupt");
        })?;

        debug!(
            path = %self.path.display(),
            enabled = config.is_enabled(),
            host = %config.host(),
            port = config.port(),
            "Loaded proxy settings"
        );

        Ok(config)
    }

    fn store(&self, config: &ProxyConfig) -> Result<(), DomainError> {
        let properties = self.encode(config)?;
        let contents = properties.render(Some(STORE_HEADER));

        let lock = lock_for(&self.path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.write_atomically(&contents)?;

        info!(
            path = %self.path.display(),
            enabled = config.is_enabled(),
            scheme = %self.protector.scheme(),
            "✓ Proxy settings stored"
        );

        Ok(())
    }
}

/// Absent flags default to true; anything other than "true" is false
fn parse_flag(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.eq_ignore_ascii_case("true"))
}
