use mockall::mock;

use proxyvault_domain::proxy_config::{
    ProxyApplier, ProxyConfig, ProxyConfigRepository, ProxyEndpoint,
};
use proxyvault_domain::shared::DomainError;

mock! {
    pub Repository {}
    impl ProxyConfigRepository for Repository {
        fn load(&self) -> Result<ProxyConfig, DomainError>;
        fn store(&self, config: &ProxyConfig) -> Result<(), DomainError>;
    }
}

mock! {
    pub Applier {}
    impl ProxyApplier for Applier {
        fn apply(&self, endpoint: &ProxyEndpoint) -> Result<(), DomainError>;
        fn clear(&self) -> Result<(), DomainError>;
        fn is_active(&self) -> bool;
    }
}
