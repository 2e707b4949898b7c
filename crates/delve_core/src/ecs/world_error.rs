use crate::ecs::Handle;
use thiserror::Error;

/// Errors surfaced by [`World`](crate::ecs::World) operations.
///
/// Nothing is retried internally; every failure is reported at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The handle is dead, null, or was never allocated.
    #[error("handle {handle} is not alive")]
    InvalidHandle { handle: Handle },

    /// Typed access on a handle that lacks the component.
    #[error("handle {handle} has no `{component}` component")]
    MissingComponent {
        handle: Handle,
        component: &'static str,
    },

    /// Every slot up to the configured ceiling is in use.
    #[error("handle capacity of {capacity} exhausted")]
    CapacityExceeded { capacity: u32 },

    /// The runs-after declarations contain a cycle; no frame may run.
    #[error("dependency cycle among system units: {}", .units.join(", "))]
    DependencyCycle { units: Vec<String> },

    #[error("system unit '{name}' is already registered")]
    DuplicateUnit { name: String },

    #[error("world has been shut down")]
    ShutDown,
}
