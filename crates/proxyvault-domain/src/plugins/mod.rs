pub mod registry;
pub mod resolver;

pub use registry::ImplementationRegistry;
pub use resolver::ImplementationResolver;

/// Priority of the baseline implementation every role must register
pub const DEFAULT_PRIORITY: i32 = 0;

/// Priority an enhanced implementation uses to override the baseline
pub const ENHANCED_PRIORITY: i32 = 100;

/// Implementation of a pluggable role, ranked by priority (higher wins)
pub trait Prioritized {
    /// Ranking used at resolution time
    fn priority(&self) -> i32;

    /// Human-readable implementation name (used in logs)
    fn name(&self) -> &str;
}
