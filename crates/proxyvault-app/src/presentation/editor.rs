use proxyvault_domain::plugins::{Prioritized, DEFAULT_PRIORITY, ENHANCED_PRIORITY};
use proxyvault_domain::proxy_config::{ProxySettingsEditor, ProxySettingsEditorFactory};

/// Plain field holder driven by the terminal prompts
#[derive(Debug, Default, Clone)]
pub struct FormEditor {
    enabled: bool,
    host: String,
    port: u16,
    requires_authentication: bool,
    username: Option<String>,
    password: Option<String>,
    conceal_password: bool,
}

impl FormEditor {
    /// Editor whose password field is read without echo
    pub fn concealed() -> Self {
        Self {
            conceal_password: true,
            ..Self::default()
        }
    }
}

impl ProxySettingsEditor for FormEditor {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn host(&self) -> String {
        self.host.clone()
    }

    fn set_host(&mut self, host: &str) {
        self.host = host.to_string();
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    fn requires_authentication(&self) -> bool {
        self.requires_authentication
    }

    fn set_requires_authentication(&mut self, requires_authentication: bool) {
        self.requires_authentication = requires_authentication;
    }

    fn username(&self) -> Option<String> {
        self.username.clone()
    }

    fn set_username(&mut self, username: Option<&str>) {
        self.username = username.map(str::to_string);
    }

    fn password(&self) -> Option<String> {
        self.password.clone()
    }

    fn set_password(&mut self, password: Option<&str>) {
        self.password = password.map(str::to_string);
    }

    fn conceals_password(&self) -> bool {
        self.conceal_password
    }
}

/// Baseline settings editor, always registered
pub struct FormEditorFactory;

impl Prioritized for FormEditorFactory {
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn name(&self) -> &str {
        "terminal-form"
    }
}

impl ProxySettingsEditorFactory for FormEditorFactory {
    fn create_editor(&self) -> Box<dyn ProxySettingsEditor> {
        Box::new(FormEditor::default())
    }
}

/// Same form with the password typed blind. Preferred whenever registered.
pub struct MaskedFormEditorFactory;

impl Prioritized for MaskedFormEditorFactory {
    fn priority(&self) -> i32 {
        ENHANCED_PRIORITY
    }

    fn name(&self) -> &str {
        "masked-terminal-form"
    }
}

impl ProxySettingsEditorFactory for MaskedFormEditorFactory {
    fn create_editor(&self) -> Box<dyn ProxySettingsEditor> {
        Box::new(FormEditor::concealed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_create_matching_editors() {
        assert!(!FormEditorFactory.create_editor().conceals_password());
        assert!(MaskedFormEditorFactory.create_editor().conceals_password());
        assert!(MaskedFormEditorFactory.priority() > FormEditorFactory.priority());
    }
}
