//! Delve Metrics - lightweight instrumentation for the ECS runtime
//!
//! Provides frame timing, named counters and per-unit profiling that
//! compile down to no-ops in production builds.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use delve_metrics::{FrameTimer, SystemProfiler};
//!
//! let mut timer = FrameTimer::new(120);
//! let mut profiler = SystemProfiler::new();
//! timer.begin();
//! profiler.time_system("movement", || step_movement());
//! timer.end();
//! tracing::info!(fps = timer.fps(), "frame done");
//! ```
//!
//! Without the `metrics` feature every type below is a zero-sized stub
//! with the same surface, so callers never need their own `cfg` gates.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod system_profiler;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use system_profiler::{SystemProfiler, SystemTiming};

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Time a block under `name` (plain evaluation when metrics are disabled)
#[macro_export]
macro_rules! time_scope {
    ($profiler:expr, $name:expr, $body:block) => {
        $profiler.time_system($name, || $body)
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
mod stubs {
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub struct FrameTimer;

    impl FrameTimer {
        pub fn new(_capacity: usize) -> Self { Self }
        pub fn begin(&mut self) {}
        pub fn end(&mut self) {}
        pub fn frames(&self) -> u64 { 0 }
        pub fn fps(&self) -> f64 { 0.0 }
        pub fn frame_time_ms(&self) -> f64 { 0.0 }
        pub fn frame_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
    }

    #[derive(Debug)]
    pub struct RingBuffer<T>(std::marker::PhantomData<T>);

    impl<T> RingBuffer<T> {
        pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
        pub fn push(&mut self, _value: T) {}
        pub fn len(&self) -> usize { 0 }
        pub fn is_empty(&self) -> bool { true }
        pub fn latest(&self) -> Option<&T> { None }
    }

    #[derive(Debug, Default)]
    pub struct Counter;

    impl Counter {
        pub fn new() -> Self { Self }
        pub fn increment(&mut self, _name: &'static str, _value: u64) {}
        pub fn set(&mut self, _name: &'static str, _value: u64) {}
        pub fn get(&self, _name: &str) -> u64 { 0 }
        pub fn reset_all(&mut self) {}
        pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ { std::iter::empty() }
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SystemTiming {
        pub total: Duration,
        pub last: Duration,
        pub calls: u64,
    }

    impl SystemTiming {
        pub fn average(&self) -> Duration { Duration::ZERO }
    }

    #[derive(Debug, Default)]
    pub struct SystemProfiler;

    impl SystemProfiler {
        pub fn new() -> Self { Self }
        pub fn time_system<F, R>(&mut self, _name: &str, f: F) -> R where F: FnOnce() -> R { f() }
        pub fn get_timing(&self, _name: &str) -> Duration { Duration::ZERO }
        pub fn timing(&self, _name: &str) -> Option<SystemTiming> { None }
        pub fn reset(&mut self) {}
        pub fn iter(&self) -> impl Iterator<Item = (&str, &SystemTiming)> + '_ { std::iter::empty() }
    }
}

#[cfg(not(feature = "metrics"))]
pub use stubs::{Counter, FrameTimer, RingBuffer, SystemProfiler, SystemTiming};
