// Domain layer - Pure business logic
// No dependencies on infrastructure or presentation layers

pub mod plugins;
pub mod proxy_config;
pub mod shared;

// Re-exports for convenience
pub use shared::{DomainError, ErrorCode, ErrorSeverity};
