//! Entity Component System core types.
//!
//! - [`Handle`]: generational (index, generation) identifier
//! - [`SparseSet`]: per-type component store with O(1) insert/remove/lookup
//!   and dense iteration
//! - [`World`]: handle allocation, component stores, tags, system units
//! - [`SystemUnit`]: per-frame logic with static "runs-after" ordering
//!
//! Execution is single-threaded. A frame is one pass of `World::run_once`
//! over the dependency-sorted units.

mod component;
mod entity;
mod query;
mod scheduler;
mod storage;
mod system;
mod tags;
mod world;
mod world_error;

pub use component::Component;
pub use entity::Handle;
pub use query::{QueryIter, QueryParams};
pub use storage::SparseSet;
pub use system::{FrameContext, SystemUnit, UnitAny, UnitId};
pub use world::World;
pub use world_error::WorldError;
