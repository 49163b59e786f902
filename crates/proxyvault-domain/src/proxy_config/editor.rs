use crate::plugins::Prioritized;

/// Accessor contract a settings editor exposes, independent of any UI toolkit
pub trait ProxySettingsEditor: Send {
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);

    fn host(&self) -> String;
    fn set_host(&mut self, host: &str);

    fn port(&self) -> u16;
    fn set_port(&mut self, port: u16);

    fn requires_authentication(&self) -> bool;
    fn set_requires_authentication(&mut self, requires_authentication: bool);

    fn username(&self) -> Option<String>;
    fn set_username(&mut self, username: Option<&str>);

    fn password(&self) -> Option<String>;
    fn set_password(&mut self, password: Option<&str>);

    /// The password is typed without being shown
    fn conceals_password(&self) -> bool {
        false
    }
}

/// Pluggable role: which concrete editor the settings session instantiates
pub trait ProxySettingsEditorFactory: Prioritized + Send + Sync {
    fn create_editor(&self) -> Box<dyn ProxySettingsEditor>;
}

/// Role name under which editor factories register
pub const SETTINGS_EDITOR_ROLE: &str = "proxy.settings-editor";
