// system.rs - System unit contract
//
// A system unit is a stateful piece of per-frame logic owned by the World.
// Units never hold a reference to the World; every hook receives it
// explicitly instead.

use crate::ecs::component::short_type_name;
use crate::ecs::World;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::time::Duration;

/// Type identity of a system unit, used for `runs_after` declarations and
/// `World::get_unit` lookups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitId {
    type_id: TypeId,
    type_name: &'static str,
}

impl UnitId {
    pub fn of<U: SystemUnit>() -> Self {
        Self {
            type_id: TypeId::of::<U>(),
            type_name: type_name::<U>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_type_name(self.type_name))
    }
}

/// Per-frame data handed to `SystemUnit::render`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameContext {
    /// Number of completed `run_once` calls when this frame was rendered.
    pub frame: u64,
    /// Interpolation factor between the last two simulation ticks.
    pub alpha: f32,
    /// Simulated time elapsed so far.
    pub elapsed: Duration,
    draw_calls: u32,
}

impl FrameContext {
    pub fn new(frame: u64, alpha: f32, elapsed: Duration) -> Self {
        Self {
            frame,
            alpha,
            elapsed,
            draw_calls: 0,
        }
    }

    pub fn record_draw(&mut self, calls: u32) {
        self.draw_calls = self.draw_calls.saturating_add(calls);
    }

    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }
}

/// Downcasting support for boxed units. Implemented for every unit type.
#[doc(hidden)]
pub trait UnitAny: Any {
    fn unit_any(&self) -> &dyn Any;
    fn unit_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> UnitAny for T {
    fn unit_any(&self) -> &dyn Any {
        self
    }

    fn unit_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A registered unit of per-frame logic.
///
/// Ordering is declared statically through [`SystemUnit::runs_after`]:
///
/// ```ignore
/// struct Reaper;
///
/// impl SystemUnit for Reaper {
///     fn runs_after() -> Vec<UnitId> {
///         vec![UnitId::of::<Combat>()]
///     }
///
///     fn update(&mut self, world: &mut World, _dt: f32) {
///         let dead: Vec<Handle> = world.query::<(Dead,)>().collect();
///         for handle in dead {
///             let _ = world.destroy(handle);
///         }
///     }
/// }
/// ```
pub trait SystemUnit: UnitAny {
    /// Units that must run before this one each frame. Read once, when the
    /// unit is registered. References to unregistered units are ignored.
    fn runs_after() -> Vec<UnitId>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Diagnostic name used in logs, profiles and errors.
    fn name(&self) -> String {
        short_type_name(type_name::<Self>())
    }

    /// Called once, before the unit joins the World.
    fn on_register(&mut self, _world: &mut World) {}

    /// Per-frame logic.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Optional presentation pass, run by `World::render` after the frame's
    /// updates in the same order.
    fn render(&mut self, _world: &World, _frame: &mut FrameContext) {}

    /// Called once when the World shuts down, in registration order.
    fn on_shutdown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    mod dungeon {
        pub struct Torchlight;
    }

    impl SystemUnit for dungeon::Torchlight {
        fn update(&mut self, _world: &mut World, _dt: f32) {}
    }

    #[test]
    fn unit_id_uses_short_display_name() {
        let id = UnitId::of::<dungeon::Torchlight>();
        assert_eq!(id, UnitId::of::<dungeon::Torchlight>());
        assert_eq!(id.to_string(), "Torchlight");
        assert!(id.type_name().ends_with("dungeon::Torchlight"));
        assert_eq!(dungeon::Torchlight.name(), "Torchlight");
    }

    #[test]
    fn frame_context_counts_draws() {
        let mut frame = FrameContext::new(3, 0.5, Duration::from_millis(50));
        frame.record_draw(2);
        frame.record_draw(u32::MAX);
        assert_eq!(frame.draw_calls(), u32::MAX);
    }
}
