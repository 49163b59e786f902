use std::sync::Arc;

use tracing::{error, info, warn};

use proxyvault_domain::proxy_config::{
    ProxyApplier, ProxyConfig, ProxyConfigRepository, ProxySettingsEditor,
    ProxySettingsEditorFactory,
};
use proxyvault_domain::shared::DomainError;

use super::proxy_config_service::apply_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Editing,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Editing => "editing",
            SessionState::Closed => "closed",
        }
    }
}

/// What `open` found in the store
#[derive(Debug)]
pub struct OpenReport {
    /// The editor shows stored values rather than defaults
    pub restored: bool,
    /// A store that exists but could not be read. Editing continues with defaults.
    pub load_error: Option<DomainError>,
}

/// What `confirm` did. The proxy is in effect even when `store_error` is set.
#[derive(Debug)]
pub struct ConfirmReport {
    pub config: ProxyConfig,
    pub store_error: Option<DomainError>,
}

/// One pass of load → edit → confirm/cancel over the stored proxy settings
///
/// Idle → Editing on `open`; Editing → Closed on a successful `confirm` or on
/// `cancel`. A rejected confirm leaves the session editing so the user can
/// correct the values.
pub struct ProxySettingsSession {
    repo: Arc<dyn ProxyConfigRepository>,
    applier: Arc<dyn ProxyApplier>,
    state: SessionState,
    editor: Option<Box<dyn ProxySettingsEditor>>,
}

impl ProxySettingsSession {
    pub fn new(repo: Arc<dyn ProxyConfigRepository>, applier: Arc<dyn ProxyApplier>) -> Self {
        Self {
            repo,
            applier,
            state: SessionState::Idle,
            editor: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The open editor, None outside Editing
    pub fn editor_mut(&mut self) -> Option<&mut (dyn ProxySettingsEditor + 'static)> {
        self.editor.as_deref_mut()
    }

    /// Create an editor and fill it with the stored settings, or defaults
    pub fn open(
        &mut self,
        factory: &dyn ProxySettingsEditorFactory,
    ) -> Result<OpenReport, DomainError> {
        self.expect_state(SessionState::Idle, "open")?;

        let mut editor = factory.create_editor();

        let (config, report) = match self.repo.load() {
            Ok(config) => (
                config,
                OpenReport {
                    restored: true,
                    load_error: None,
                },
            ),
            Err(e) if e.is_benign() => {
                info!("No stored proxy settings, starting from defaults");
                (
                    ProxyConfig::default(),
                    OpenReport {
                        restored: false,
                        load_error: None,
                    },
                )
            }
            Err(e) => {
                warn!(error = %e, "Stored proxy settings unreadable, starting from defaults");
                (
                    ProxyConfig::default(),
                    OpenReport {
                        restored: false,
                        load_error: Some(e),
                    },
                )
            }
        };

        config.write_to(editor.as_mut());
        self.editor = Some(editor);
        self.state = SessionState::Editing;

        info!(
            editor = factory.name(),
            restored = report.restored,
            "Proxy settings session opened"
        );
        Ok(report)
    }

    /// Validate and apply the edited settings, then store them
    pub fn confirm(&mut self) -> Result<ConfirmReport, DomainError> {
        self.expect_state(SessionState::Editing, "confirm")?;
        let editor = self
            .editor
            .as_deref()
            .ok_or_else(|| DomainError::InvalidState("Session has no editor".to_string()))?;

        let config = ProxyConfig::from_editor(editor);
        config.validate()?;

        apply_config(self.applier.as_ref(), &config).inspect_err(|e| {
            warn!(error = %e, "Proxy could not be applied, session stays open");
        })?;

        let stored = config.minimized();
        let store_error = self.repo.store(&stored).err();
        if let Some(e) = &store_error {
            error!(error = %e, "Proxy applied but settings could not be stored");
        }

        self.close();
        info!(enabled = stored.is_enabled(), "Proxy settings confirmed");

        Ok(ConfirmReport {
            config: stored,
            store_error,
        })
    }

    /// Discard the edits; nothing is applied or stored
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.expect_state(SessionState::Editing, "cancel")?;
        self.close();
        info!("Proxy settings session cancelled");
        Ok(())
    }

    fn close(&mut self) {
        self.editor = None;
        self.state = SessionState::Closed;
    }

    fn expect_state(&self, expected: SessionState, operation: &str) -> Result<(), DomainError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidState(format!(
                "Cannot {} a session that is {}",
                operation,
                self.state.as_str()
            )))
        }
    }
}
