//! Deterministic time system
//!
//! Fixed tick rate with interpolation alpha for rendering

use std::time::Duration;

/// Default simulation tick rate (60 Hz = 16.666ms per tick)
pub const TICK_RATE_HZ: u32 = 60;

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimulationTime {
    tick_rate_hz: u32,
    tick_duration: Duration,
    tick_count: u64,
    accumulated_time: Duration,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::with_tick_rate(TICK_RATE_HZ)
    }

    /// A rate of zero is treated as one tick per second.
    pub fn with_tick_rate(tick_rate_hz: u32) -> Self {
        let tick_rate_hz = tick_rate_hz.max(1);
        Self {
            tick_rate_hz,
            tick_duration: Duration::from_secs(1) / tick_rate_hz,
            tick_count: 0,
            accumulated_time: Duration::ZERO,
        }
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Fixed step in seconds, as passed to `World::run_once`.
    pub fn dt(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick_duration;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }

    /// Fraction of a tick covered by `leftover` wall time, clamped to [0, 1].
    pub fn alpha(&self, leftover: Duration) -> f32 {
        (leftover.as_secs_f32() / self.tick_duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new()
    }
}
