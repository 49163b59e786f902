use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use super::Prioritized;
use crate::shared::DomainError;

struct Candidate<F: ?Sized> {
    priority: i32,
    implementation: Arc<F>,
}

/// Implementation registry
///
/// Maps a role name to the implementations registered for it, kept ordered by
/// priority (highest first). Equal priorities keep registration order, so the
/// first registered implementation wins a tie.
///
/// Populated explicitly by each implementation module at startup.
pub struct ImplementationRegistry<F: ?Sized> {
    roles: RwLock<HashMap<String, Vec<Candidate<F>>>>,
}

impl<F: Prioritized + ?Sized> ImplementationRegistry<F> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Register an implementation for `role`
    pub fn register(&self, role: &str, implementation: Arc<F>) {
        let priority = implementation.priority();
        info!(
            role,
            implementation = implementation.name(),
            priority,
            "🔌 Registering implementation"
        );

        let mut roles = self.roles.write().unwrap_or_else(PoisonError::into_inner);
        let candidates = roles.entry(role.to_string()).or_default();
        candidates.push(Candidate {
            priority,
            implementation,
        });
        // Stable sort: ties stay in registration order
        candidates.sort_by_key(|candidate| Reverse(candidate.priority));
    }

    /// All implementations registered for `role`, highest priority first
    pub fn candidates(&self, role: &str) -> Vec<Arc<F>> {
        let roles = self.roles.read().unwrap_or_else(PoisonError::into_inner);
        roles
            .get(role)
            .map(|candidates| {
                candidates
                    .iter()
                    .map(|c| Arc::clone(&c.implementation))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of implementations registered for `role`
    pub fn count(&self, role: &str) -> usize {
        let roles = self.roles.read().unwrap_or_else(PoisonError::into_inner);
        roles.get(role).map_or(0, Vec::len)
    }

    /// Pick the winning implementation for `role`
    ///
    /// # Returns
    /// The highest-priority implementation, or
    /// `DomainError::NoImplementationAvailable` when nothing is registered
    pub fn resolve(&self, role: &str) -> Result<Arc<F>, DomainError> {
        let roles = self.roles.read().unwrap_or_else(PoisonError::into_inner);
        let winner = roles
            .get(role)
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| {
                DomainError::NoImplementationAvailable(format!(
                    "no implementation registered for role '{}'",
                    role
                ))
            })?;

        debug!(
            role,
            implementation = winner.implementation.name(),
            priority = winner.priority,
            "Resolved implementation"
        );

        Ok(Arc::clone(&winner.implementation))
    }
}

impl<F: Prioritized + ?Sized> Default for ImplementationRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}
