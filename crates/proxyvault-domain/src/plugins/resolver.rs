use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use super::{ImplementationRegistry, Prioritized};
use crate::shared::DomainError;

/// Selects the active implementation of one role, once per process
///
/// The first successful `resolve` caches its choice; later registrations do
/// not change it. Reads after initialisation are lock-free.
pub struct ImplementationResolver<F: ?Sized> {
    registry: Arc<ImplementationRegistry<F>>,
    role: String,
    selected: OnceCell<Arc<F>>,
}

impl<F: Prioritized + ?Sized> ImplementationResolver<F> {
    pub fn new(registry: Arc<ImplementationRegistry<F>>, role: impl Into<String>) -> Self {
        Self {
            registry,
            role: role.into(),
            selected: OnceCell::new(),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Resolve the role, or return the cached selection
    pub fn resolve(&self) -> Result<Arc<F>, DomainError> {
        self.selected
            .get_or_try_init(|| {
                let winner = self.registry.resolve(&self.role)?;
                info!(
                    role = %self.role,
                    implementation = winner.name(),
                    priority = winner.priority(),
                    "✓ Selected implementation"
                );
                Ok(winner)
            })
            .map(Arc::clone)
    }

    /// The cached selection, if `resolve` already succeeded
    pub fn selected(&self) -> Option<Arc<F>> {
        self.selected.get().cloned()
    }
}
