use std::path::PathBuf;

/// Directory under the user's home holding everything the app writes
pub const APP_DIR_NAME: &str = ".proxyvault";

/// Store file name. Also the constant the password key is derived from.
pub const STORE_FILE_NAME: &str = "proxy.properties";

pub const CONFIG_FILE_NAME: &str = "app_config.json";

const LOG_DIR_NAME: &str = "logs";

/// `<home>/.proxyvault`, or `./.proxyvault` when no home directory is known
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_store_path() -> PathBuf {
    default_app_dir().join(STORE_FILE_NAME)
}

pub fn default_config_path() -> PathBuf {
    default_app_dir().join(CONFIG_FILE_NAME)
}

pub fn default_log_dir() -> PathBuf {
    default_app_dir().join(LOG_DIR_NAME)
}
