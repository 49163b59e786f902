pub mod paths;

pub use paths::{
    default_app_dir, default_config_path, default_log_dir, default_store_path, APP_DIR_NAME,
    CONFIG_FILE_NAME, STORE_FILE_NAME,
};
