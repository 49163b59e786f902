use std::sync::Arc;

use tracing::{error, info};

use proxyvault_domain::proxy_config::{ProxyApplier, ProxyConfig, ProxyConfigRepository};
use proxyvault_domain::shared::DomainError;

use crate::application::dtos::{ProxyConfigDto, UpdateProxyConfigInput};

/// Result of `update`: the proxy is in effect even when `store_error` is set
#[derive(Debug)]
pub struct UpdateOutcome {
    pub config: ProxyConfigDto,
    pub store_error: Option<DomainError>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The stored proxy is now in effect
    Applied(ProxyConfigDto),
    /// A configuration is stored but switched off; nothing was applied
    Disabled,
    NothingStored,
}

/// Make `config` take effect: apply its endpoint, or clear when disabled
pub(crate) fn apply_config(
    applier: &dyn ProxyApplier,
    config: &ProxyConfig,
) -> Result<(), DomainError> {
    match config.endpoint() {
        Some(endpoint) => applier.apply(&endpoint),
        None => applier.clear(),
    }
}

/// Non-interactive operations on the stored proxy
pub struct ProxyConfigService {
    repo: Arc<dyn ProxyConfigRepository>,
    applier: Arc<dyn ProxyApplier>,
}

impl ProxyConfigService {
    pub fn new(repo: Arc<dyn ProxyConfigRepository>, applier: Arc<dyn ProxyApplier>) -> Self {
        Self { repo, applier }
    }

    /// Stored configuration, None before the first store
    pub fn get(&self) -> Result<Option<ProxyConfigDto>, DomainError> {
        match self.repo.load() {
            Ok(config) => Ok(Some(ProxyConfigDto::from(&config))),
            Err(e) if e.is_benign() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Validate, apply, then store. A failed store does not undo the apply.
    pub fn update(&self, input: UpdateProxyConfigInput) -> Result<UpdateOutcome, DomainError> {
        let config = input.to_config();
        config.validate()?;

        apply_config(self.applier.as_ref(), &config)?;

        let stored = config.minimized();
        let store_error = self.repo.store(&stored).err();
        if let Some(e) = &store_error {
            error!(error = %e, "Proxy applied but could not be stored");
        }

        Ok(UpdateOutcome {
            config: ProxyConfigDto::from(&stored),
            store_error,
        })
    }

    /// Apply the last stored proxy if it is enabled
    pub fn restore_last_stored(&self) -> Result<RestoreOutcome, DomainError> {
        let config = match self.repo.load() {
            Ok(config) => config,
            Err(e) if e.is_benign() => return Ok(RestoreOutcome::NothingStored),
            Err(e) => return Err(e),
        };

        let Some(endpoint) = config.endpoint() else {
            info!("Stored proxy is disabled, nothing to restore");
            return Ok(RestoreOutcome::Disabled);
        };

        self.applier.apply(&endpoint)?;
        Ok(RestoreOutcome::Applied(ProxyConfigDto::from(&config)))
    }

    /// Remove the proxy from this process. The store is left untouched.
    pub fn clear(&self) -> Result<(), DomainError> {
        self.applier.clear()
    }

    pub fn is_proxy_set(&self) -> bool {
        self.applier.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::mocks::{MockApplier, MockRepository};
    use proxyvault_domain::proxy_config::ProxyEndpoint;

    fn service(repo: MockRepository, applier: MockApplier) -> ProxyConfigService {
        ProxyConfigService::new(Arc::new(repo), Arc::new(applier))
    }

    fn input(host: &str, port: u16) -> UpdateProxyConfigInput {
        UpdateProxyConfigInput {
            enabled: true,
            host: host.to_string(),
            port,
            requires_authentication: true,
            username: Some("alice".to_string()),
            password: Some("s3cret".to_string()),
        }
    }

    #[test]
    fn test_get_returns_none_on_first_run() {
        let mut repo = MockRepository::new();
        repo.expect_load()
            .times(1)
            .returning(|| Err(DomainError::NotFound("proxy.properties".to_string())));

        assert_eq!(service(repo, MockApplier::new()).get().unwrap(), None);
    }

    #[test]
    fn test_get_propagates_corruption() {
        let mut repo = MockRepository::new();
        repo.expect_load()
            .returning(|| Err(DomainError::Corrupt("port".to_string())));

        assert!(matches!(
            service(repo, MockApplier::new()).get(),
            Err(DomainError::Corrupt(_))
        ));
    }

    #[test]
    fn test_update_applies_then_stores() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();

        applier
            .expect_apply()
            .withf(|endpoint: &ProxyEndpoint| {
                endpoint.host == "proxy.corp"
                    && endpoint.port == 3128
                    && endpoint.credentials.is_some()
            })
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_store()
            .withf(|config: &ProxyConfig| config.password() == Some("s3cret"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = service(repo, applier).update(input("proxy.corp", 3128)).unwrap();
        assert!(outcome.store_error.is_none());
        assert!(outcome.config.has_password);
    }

    #[test]
    fn test_update_rejects_invalid_input_before_any_call() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        applier.expect_apply().times(0);
        applier.expect_clear().times(0);
        repo.expect_store().times(0);

        let result = service(repo, applier).update(input("   ", 3128));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_update_does_not_store_when_apply_fails() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        applier
            .expect_apply()
            .times(1)
            .returning(|_| Err(DomainError::ApplyFailure("refused".to_string())));
        repo.expect_store().times(0);

        let result = service(repo, applier).update(input("proxy.corp", 3128));
        assert!(matches!(result, Err(DomainError::ApplyFailure(_))));
    }

    #[test]
    fn test_update_reports_store_failure() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        applier.expect_apply().returning(|_| Ok(()));
        repo.expect_store()
            .times(1)
            .returning(|_| Err(DomainError::Io("disk full".to_string())));

        let outcome = service(repo, applier).update(input("proxy.corp", 3128)).unwrap();
        assert!(matches!(outcome.store_error, Some(DomainError::Io(_))));
    }

    #[test]
    fn test_update_disabled_clears_and_minimises() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        applier.expect_apply().times(0);
        applier.expect_clear().times(1).returning(|| Ok(()));
        repo.expect_store()
            .withf(|config: &ProxyConfig| !config.is_enabled() && config.username().is_none())
            .times(1)
            .returning(|_| Ok(()));

        let mut disabled = input("", 0);
        disabled.enabled = false;
        disabled.requires_authentication = false;

        service(repo, applier).update(disabled).unwrap();
    }

    #[test]
    fn test_restore_applies_enabled_config() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        repo.expect_load()
            .returning(|| Ok(ProxyConfig::without_authentication("proxy.corp", 8080)));
        applier
            .expect_apply()
            .withf(|endpoint: &ProxyEndpoint| endpoint.credentials.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let outcome = service(repo, applier).restore_last_stored().unwrap();
        assert!(matches!(outcome, RestoreOutcome::Applied(dto) if dto.port == 8080));
    }

    #[test]
    fn test_restore_skips_disabled_config() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        repo.expect_load().returning(|| {
            let mut config = ProxyConfig::without_authentication("proxy.corp", 8080);
            config.set_enabled(false);
            Ok(config)
        });
        applier.expect_apply().times(0);
        applier.expect_clear().times(0);

        assert_eq!(
            service(repo, applier).restore_last_stored().unwrap(),
            RestoreOutcome::Disabled
        );
    }

    #[test]
    fn test_restore_with_nothing_stored() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        repo.expect_load()
            .returning(|| Err(DomainError::NotFound("proxy.properties".to_string())));
        applier.expect_apply().times(0);

        assert_eq!(
            service(repo, applier).restore_last_stored().unwrap(),
            RestoreOutcome::NothingStored
        );
    }

    #[test]
    fn test_clear_and_is_proxy_set_delegate_to_applier() {
        let mut repo = MockRepository::new();
        let mut applier = MockApplier::new();
        repo.expect_store().times(0);
        applier.expect_clear().times(1).returning(|| Ok(()));
        applier.expect_is_active().return_const(false);

        let service = service(repo, applier);
        service.clear().unwrap();
        assert!(!service.is_proxy_set());
    }
}
