//! Delve Engine Core
//!
//! Contains the fundamental simulation pieces:
//! - Entity Component System (handles, sparse-set stores, tags, queries)
//! - Dependency-ordered system scheduler
//! - Fixed-step simulation time
//! - World configuration

pub mod config;
pub mod ecs;
pub mod time;

pub use config::{ConfigError, WorldConfig};
pub use ecs::{FrameContext, Handle, SystemUnit, UnitId, World, WorldError};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
