//! Toy simulation units driven by the headless runtime.
//!
//! Spawner → Movement → Decay → Regeneration → Reaper → Tally

use delve_core::{FrameContext, Handle, SystemUnit, UnitId, World, WorldError};
use glam::Vec2;
use tracing::{debug, info};

pub const ENEMY: &str = "enemy";
pub const CRITTER: &str = "critter";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }
}

/// Register every toy unit. Registration order is deliberately shuffled;
/// the runs-after edges fix the execution order.
pub fn register_all(world: &mut World) -> Result<(), WorldError> {
    world.register_unit(Tally::default())?;
    world.register_unit(Reaper::default())?;
    world.register_unit(Regeneration { per_second: 4.0 })?;
    world.register_unit(Decay { per_second: 10.0 })?;
    world.register_unit(Movement { bounds: 64.0 })?;
    world.register_unit(Spawner::new(15))?;
    Ok(())
}

/// Mints a new entity every `every` frames, alternating enemies and critters.
pub struct Spawner {
    every: u64,
    ticks: u64,
    spawned: u64,
}

impl Spawner {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            ticks: 0,
            spawned: 0,
        }
    }

    fn spawn(&mut self, world: &mut World) -> Result<Handle, WorldError> {
        let handle = world.create()?;
        let n = self.spawned as f32;
        let heading = Vec2::from_angle(n * 0.7);
        world.set(handle, Position(heading * 4.0))?;
        world.set(handle, Velocity(heading * (2.0 + n % 3.0)))?;
        if self.spawned % 2 == 0 {
            world.set(handle, Health::full(20.0))?;
            world.add_tag(handle, ENEMY)?;
        } else {
            world.set(handle, Health::full(10.0))?;
            world.add_tag(handle, CRITTER)?;
        }
        self.spawned += 1;
        Ok(handle)
    }
}

impl SystemUnit for Spawner {
    fn on_register(&mut self, world: &mut World) {
        for _ in 0..4 {
            if let Err(err) = self.spawn(world) {
                debug!(error = %err, "initial spawn skipped");
            }
        }
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        self.ticks += 1;
        if self.ticks % self.every != 0 {
            return;
        }
        match self.spawn(world) {
            Ok(handle) => debug!(%handle, "spawned"),
            Err(err) => debug!(error = %err, "spawn skipped"),
        }
    }
}

/// Integrates velocity and bounces off a square arena.
pub struct Movement {
    bounds: f32,
}

impl SystemUnit for Movement {
    fn runs_after() -> Vec<UnitId> {
        vec![UnitId::of::<Spawner>()]
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let moving: Vec<Handle> = world.query::<(Position, Velocity)>().collect();
        for handle in moving {
            let Some(Velocity(mut velocity)) = world.try_get::<Velocity>(handle) else {
                continue;
            };
            let Ok(Position(position)) = world.get_mut::<Position>(handle) else {
                continue;
            };
            *position += velocity * dt;
            if position.x.abs() > self.bounds {
                velocity.x = -velocity.x;
            }
            if position.y.abs() > self.bounds {
                velocity.y = -velocity.y;
            }
            *position = position.clamp(Vec2::splat(-self.bounds), Vec2::splat(self.bounds));
            if let Err(err) = world.set(handle, Velocity(velocity)) {
                debug!(%handle, error = %err, "velocity update skipped");
            }
        }
    }
}

/// Enemies lose health over time.
pub struct Decay {
    per_second: f32,
}

impl SystemUnit for Decay {
    fn runs_after() -> Vec<UnitId> {
        vec![UnitId::of::<Movement>()]
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let enemies: Vec<Handle> = world.entities_with_tag(ENEMY).collect();
        for handle in enemies {
            if let Ok(health) = world.get_mut::<Health>(handle) {
                health.current -= self.per_second * dt;
            }
        }
    }
}

/// Critters heal back up to their maximum.
pub struct Regeneration {
    per_second: f32,
}

impl SystemUnit for Regeneration {
    fn runs_after() -> Vec<UnitId> {
        vec![UnitId::of::<Decay>()]
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let critters: Vec<Handle> = world.entities_with_tag(CRITTER).collect();
        for handle in critters {
            if let Ok(health) = world.get_mut::<Health>(handle) {
                health.current = (health.current + self.per_second * dt).min(health.max);
            }
        }
    }
}

/// Destroys anything whose health reached zero.
#[derive(Default)]
pub struct Reaper {
    reaped: u64,
}

impl Reaper {
    pub fn reaped(&self) -> u64 {
        self.reaped
    }
}

impl SystemUnit for Reaper {
    fn runs_after() -> Vec<UnitId> {
        vec![UnitId::of::<Decay>(), UnitId::of::<Regeneration>()]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let dead: Vec<Handle> = world
            .iter::<Health>()
            .filter(|(_, health)| health.current <= 0.0)
            .map(|(handle, _)| handle)
            .collect();
        for handle in dead {
            if world.destroy(handle).is_ok() {
                self.reaped += 1;
                debug!(%handle, "reaped");
            }
        }
    }
}

/// Population counts after the frame settles. Also the only unit that draws.
#[derive(Default)]
pub struct Tally {
    pub enemies: usize,
    pub critters: usize,
    pub peak: usize,
}

impl SystemUnit for Tally {
    fn runs_after() -> Vec<UnitId> {
        vec![UnitId::of::<Reaper>()]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        self.enemies = world.entities_with_tag(ENEMY).count();
        self.critters = world.entities_with_tag(CRITTER).count();
        self.peak = self.peak.max(world.len());
    }

    fn render(&mut self, world: &World, frame: &mut FrameContext) {
        let visible = world.query::<(Position,)>().count();
        frame.record_draw(visible as u32);
    }

    fn on_shutdown(&mut self) {
        info!(
            enemies = self.enemies,
            critters = self.critters,
            peak = self.peak,
            "final population"
        );
    }
}
