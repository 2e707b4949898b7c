//! Delve Runtime
//!
//! Headless binary that drives a World through a fixed-step loop.
//! Usage: `delve [settings.json]`

mod settings;
mod units;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use delve_core::time::SimulationTime;
use delve_core::{FrameContext, World};
use delve_metrics::FrameTimer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use settings::RuntimeSettings;
use units::{Reaper, Tally};

fn main() -> Result<()> {
    init_tracing();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = RuntimeSettings::load(path.as_deref())?;
    info!("Delve Engine v{}", delve_core::VERSION);
    info!(?settings, "settings loaded");

    let mut world = World::with_config(settings.world.clone())?;
    units::register_all(&mut world)?;
    let order = world.execution_order()?.join(" -> ");
    info!(%order, "schedule resolved");

    let mut time = SimulationTime::with_tick_rate(settings.tick_hz);
    let mut timer = FrameTimer::new(120);

    for _ in 0..settings.frames {
        timer.begin();
        world.run_once(time.dt())?;
        time.advance_tick();

        // Headless: no wall-clock remainder to interpolate over.
        let alpha = time.alpha(Duration::ZERO);
        let mut frame = FrameContext::new(world.frame(), alpha, time.total_time());
        world.render(&mut frame)?;
        timer.end();

        if settings.log_every > 0 && world.frame() % settings.log_every == 0 {
            let tally = world.get_unit::<Tally>();
            info!(
                frame = world.frame(),
                live = world.len(),
                enemies = tally.map_or(0, |t| t.enemies),
                critters = tally.map_or(0, |t| t.critters),
                draws = frame.draw_calls(),
                fps = timer.fps().round(),
                frame_ms = timer.frame_time_ms(),
                "frame"
            );
        }
    }

    report(&world, &timer);
    world.shutdown();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn report(world: &World, timer: &FrameTimer) {
    let (min_ms, max_ms) = timer.frame_time_range_ms();
    info!(
        frames = timer.frames(),
        min_ms,
        max_ms,
        reaped = world.get_unit::<Reaper>().map_or(0, Reaper::reaped),
        "simulation finished"
    );
    for (name, timing) in world.profiler().iter() {
        info!(
            unit = name,
            calls = timing.calls,
            avg_us = timing.average().as_micros() as u64,
            total_ms = timing.total.as_millis() as u64,
            "unit profile"
        );
    }
    for (name, value) in world.counters().iter() {
        info!(counter = name, value, "counter");
    }
}
