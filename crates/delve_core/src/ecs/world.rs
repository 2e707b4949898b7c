// world.rs - ECS World: handle lifecycle, component stores, tags and units

use crate::config::{ConfigError, WorldConfig};
use crate::ecs::component::{short_type_name, Component, ComponentStore};
use crate::ecs::query::{QueryIter, QueryParams, StoreMap};
use crate::ecs::scheduler::{Scheduler, UnitDecl};
use crate::ecs::storage::SparseSet;
use crate::ecs::tags::TagIndex;
use crate::ecs::{FrameContext, Handle, SystemUnit, UnitId, WorldError};
use delve_metrics::{time_scope, Counter, SystemProfiler};
use std::any::{type_name, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A registered unit. The box is vacated while the unit's own hook runs.
struct UnitSlot {
    name: Arc<str>,
    unit: Option<Box<dyn SystemUnit>>,
}

/// The main ECS container.
///
/// Owns handle allocation, one sparse-set store per component type, the tag
/// index and the registered system units with their cached execution order.
///
/// ```ignore
/// let mut world = World::new();
/// let goblin = world.create()?;
/// world.set(goblin, Health { max: 30, cur: 30 })?;
/// world.add_tag(goblin, "enemy")?;
/// world.register_unit(Regeneration::default())?;
/// world.run_once(1.0 / 60.0)?;
/// ```
pub struct World {
    config: WorldConfig,
    /// Slot 0 is reserved for the null handle; `len()` is the next fresh index.
    generations: Vec<u32>,
    occupied: Vec<bool>,
    free: VecDeque<u32>,
    live: usize,
    stores: StoreMap,
    tags: TagIndex,
    units: Vec<UnitSlot>,
    decls: Vec<UnitDecl>,
    unit_lookup: HashMap<TypeId, usize>,
    scheduler: Scheduler,
    profiler: SystemProfiler,
    counters: Counter,
    frame: u64,
    shut_down: bool,
    /// Nonzero while a unit's `update` is running.
    update_depth: u32,
    /// Shutdown requested from inside `update`; hooks run once the unit is back.
    teardown_pending: bool,
}

impl World {
    /// Create a world with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }

    /// Create a world after validating `config`.
    pub fn with_config(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Shorthand for a world with a custom handle ceiling.
    pub fn with_capacity(capacity: u32) -> Result<Self, ConfigError> {
        Self::with_config(WorldConfig::with_capacity(capacity))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            config,
            generations: vec![0],
            occupied: vec![false],
            free: VecDeque::new(),
            live: 0,
            stores: HashMap::new(),
            tags: TagIndex::new(),
            units: Vec::new(),
            decls: Vec::new(),
            unit_lookup: HashMap::new(),
            scheduler: Scheduler::new(),
            profiler: SystemProfiler::new(),
            counters: Counter::new(),
            frame: 0,
            shut_down: false,
            update_depth: 0,
            teardown_pending: false,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ── Handle lifecycle ─────────────────────────────────────────────

    /// Allocate a handle, recycling the oldest freed index first.
    pub fn create(&mut self) -> Result<Handle, WorldError> {
        let index = match self.free.pop_front() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as u32;
                if index > self.config.capacity {
                    warn!(capacity = self.config.capacity, "handle capacity exhausted");
                    return Err(WorldError::CapacityExceeded {
                        capacity: self.config.capacity,
                    });
                }
                self.generations.push(0);
                self.occupied.push(false);
                index
            }
        };

        self.occupied[index as usize] = true;
        self.live += 1;
        self.counters.increment("handles.created", 1);

        let handle = Handle::new(index, self.generations[index as usize]);
        trace!(%handle, "handle created");
        Ok(handle)
    }

    /// Destroy a handle, detaching every component and tag it carries.
    ///
    /// Components and tags are purged before the generation is bumped. A
    /// slot whose generation would overflow is retired instead of recycled.
    pub fn destroy(&mut self, handle: Handle) -> Result<(), WorldError> {
        self.ensure_alive(handle)?;
        let index = handle.index();

        for store in self.stores.values_mut() {
            store.remove_index(index);
        }
        let tags = self.tags.purge(index);

        let slot = index as usize;
        self.occupied[slot] = false;
        self.live -= 1;
        match self.generations[slot].checked_add(1) {
            Some(next) => {
                self.generations[slot] = next;
                self.free.push_back(index);
            }
            None => debug!(index, "retiring handle slot with exhausted generation"),
        }
        self.counters.increment("handles.destroyed", 1);

        trace!(%handle, tags, "handle destroyed");
        Ok(())
    }

    /// O(1) liveness check. Never mutates.
    pub fn is_alive(&self, handle: Handle) -> bool {
        let slot = handle.index() as usize;
        handle.index() != 0
            && slot < self.generations.len()
            && self.occupied[slot]
            && self.generations[slot] == handle.generation()
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> u32 {
        self.config.capacity
    }

    /// All live handles in index order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.occupied
            .iter()
            .enumerate()
            .filter(|(_, &occupied)| occupied)
            .map(move |(slot, _)| Handle::new(slot as u32, self.generations[slot]))
    }

    fn ensure_alive(&self, handle: Handle) -> Result<(), WorldError> {
        if self.is_alive(handle) {
            Ok(())
        } else {
            Err(WorldError::InvalidHandle { handle })
        }
    }

    // ── Components ───────────────────────────────────────────────────

    fn store<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<SparseSet<T>>())
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<SparseSet<T>>())
    }

    fn store_or_insert<T: Component>(&mut self) -> &mut SparseSet<T> {
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                debug!(component = type_name::<T>(), "component store created");
                let store: Box<dyn ComponentStore> = Box::new(SparseSet::<T>::new());
                store
            })
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            // Stores are keyed by the TypeId of their own component type.
            .unwrap_or_else(|| unreachable!("store for {} has a foreign type", type_name::<T>()))
    }

    /// Attach or overwrite `T` on `handle`. Returns the replaced value.
    pub fn set<T: Component>(&mut self, handle: Handle, value: T) -> Result<Option<T>, WorldError> {
        self.ensure_alive(handle)?;
        Ok(self.store_or_insert::<T>().insert(handle.index(), value))
    }

    pub fn get<T: Component>(&self, handle: Handle) -> Result<&T, WorldError> {
        self.ensure_alive(handle)?;
        self.store::<T>()
            .and_then(|store| store.get(handle.index()))
            .ok_or(WorldError::MissingComponent {
                handle,
                component: type_name::<T>(),
            })
    }

    /// Mutable access into the dense array.
    ///
    /// The reference borrows the whole World, so no structural change to
    /// any store can happen while it is held.
    pub fn get_mut<T: Component>(&mut self, handle: Handle) -> Result<&mut T, WorldError> {
        self.ensure_alive(handle)?;
        self.store_mut::<T>()
            .and_then(|store| store.get_mut(handle.index()))
            .ok_or(WorldError::MissingComponent {
                handle,
                component: type_name::<T>(),
            })
    }

    /// Copy of `T` on `handle`, or `None` if absent or dead.
    pub fn try_get<T: Component + Clone>(&self, handle: Handle) -> Option<T> {
        if !self.is_alive(handle) {
            return None;
        }
        self.store::<T>()?.get(handle.index()).cloned()
    }

    pub fn has<T: Component>(&self, handle: Handle) -> bool {
        self.is_alive(handle)
            && self
                .store::<T>()
                .is_some_and(|store| store.contains(handle.index()))
    }

    /// Detach `T`. Returns whether it was present.
    pub fn remove<T: Component>(&mut self, handle: Handle) -> Result<bool, WorldError> {
        Ok(self.take::<T>(handle)?.is_some())
    }

    /// Detach `T`, handing back the removed value.
    pub fn take<T: Component>(&mut self, handle: Handle) -> Result<Option<T>, WorldError> {
        self.ensure_alive(handle)?;
        Ok(self
            .store_mut::<T>()
            .and_then(|store| store.remove(handle.index())))
    }

    /// Number of handles carrying `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.store::<T>().map_or(0, SparseSet::len)
    }

    /// Read-only view of the store for `T`, if it exists yet.
    pub fn store_of<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.store::<T>()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Live handles carrying every component in `Q`.
    ///
    /// ```ignore
    /// let burning: Vec<Handle> = world.query::<(Health, OnFire)>().collect();
    /// ```
    pub fn query<Q: QueryParams>(&self) -> QueryIter<'_> {
        QueryIter::new(&self.stores, &Q::component_ids(), &self.generations)
    }

    /// `(handle, &T)` pairs in dense order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        let generations = &self.generations;
        self.store::<T>()
            .into_iter()
            .flat_map(|store| store.iter())
            .map(move |(index, value)| (Handle::new(index, generations[index as usize]), value))
    }

    /// `(handle, &mut T)` pairs in dense order; a single mutable pass over `T`.
    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        let generations = &self.generations;
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<SparseSet<T>>())
            .into_iter()
            .flat_map(|store| store.iter_mut())
            .map(move |(index, value)| (Handle::new(index, generations[index as usize]), value))
    }

    // ── Tags ─────────────────────────────────────────────────────────

    /// Returns `true` if the tag was newly attached.
    pub fn add_tag(&mut self, handle: Handle, tag: &str) -> Result<bool, WorldError> {
        self.ensure_alive(handle)?;
        Ok(self.tags.insert(handle.index(), tag))
    }

    /// Returns `true` if the tag was attached before the call.
    pub fn remove_tag(&mut self, handle: Handle, tag: &str) -> Result<bool, WorldError> {
        self.ensure_alive(handle)?;
        Ok(self.tags.remove(handle.index(), tag))
    }

    pub fn has_tag(&self, handle: Handle, tag: &str) -> bool {
        self.is_alive(handle) && self.tags.contains(handle.index(), tag)
    }

    /// Live handles carrying `tag`, rebuilt from current generations.
    pub fn entities_with_tag(&self, tag: &str) -> impl Iterator<Item = Handle> + '_ {
        self.tags
            .indices(tag)
            .map(move |index| Handle::new(index, self.generations[index as usize]))
            .filter(move |&handle| self.is_alive(handle))
    }

    pub fn tags_of(&self, handle: Handle) -> impl Iterator<Item = &str> + '_ {
        self.is_alive(handle)
            .then(|| self.tags.tags_of(handle.index()))
            .into_iter()
            .flatten()
    }

    // ── System units ─────────────────────────────────────────────────

    /// Register a unit. Its `on_register` hook runs before it joins the
    /// schedule, and the cached execution order is invalidated.
    pub fn register_unit<U: SystemUnit>(&mut self, mut unit: U) -> Result<(), WorldError> {
        if self.shut_down {
            return Err(WorldError::ShutDown);
        }
        let id = UnitId::of::<U>();
        if self.unit_lookup.contains_key(&id.type_id()) {
            return Err(WorldError::DuplicateUnit {
                name: unit.name(),
            });
        }

        unit.on_register(self);
        if self.shut_down {
            return Err(WorldError::ShutDown);
        }
        // The hook may itself have registered a unit of this type.
        if self.unit_lookup.contains_key(&id.type_id()) {
            return Err(WorldError::DuplicateUnit {
                name: unit.name(),
            });
        }

        let name: Arc<str> = unit.name().into();
        let runs_after = U::runs_after();
        debug!(
            unit = %name,
            runs_after = ?runs_after.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "system unit registered"
        );

        self.unit_lookup.insert(id.type_id(), self.units.len());
        self.units.push(UnitSlot {
            name,
            unit: Some(Box::new(unit)),
        });
        self.decls.push(UnitDecl { id, runs_after });
        self.scheduler.invalidate();
        Ok(())
    }

    /// Look up a registered unit by type.
    ///
    /// Returns `None` for a unit whose own hook is currently running.
    pub fn get_unit<U: SystemUnit>(&self) -> Option<&U> {
        let &index = self.unit_lookup.get(&TypeId::of::<U>())?;
        let unit = self.units[index].unit.as_deref()?;
        <dyn SystemUnit as crate::ecs::system::UnitAny>::unit_any(unit).downcast_ref::<U>()
    }

    pub fn get_unit_mut<U: SystemUnit>(&mut self) -> Option<&mut U> {
        let &index = self.unit_lookup.get(&TypeId::of::<U>())?;
        let unit = self.units[index].unit.as_deref_mut()?;
        <dyn SystemUnit as crate::ecs::system::UnitAny>::unit_any_mut(unit).downcast_mut::<U>()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Unit names in execution order, building the schedule if needed.
    pub fn execution_order(&mut self) -> Result<Vec<&str>, WorldError> {
        if !self.scheduler.is_ordered() {
            debug!(units = self.decls.len(), "resolving execution order");
        }
        let order = self.scheduler.order(&self.decls)?;
        Ok(order
            .iter()
            .map(|&index| &*self.units[index].name)
            .collect())
    }

    /// Run one frame: resolve the schedule if it changed, then call every
    /// unit's `update` once, in dependency order.
    ///
    /// A dependency cycle fails the call before any unit runs. Units
    /// registered during the frame join on the next one. A unit calling
    /// `shutdown` ends the frame as soon as it returns, with `ShutDown`.
    pub fn run_once(&mut self, dt: f32) -> Result<(), WorldError> {
        if self.shut_down {
            return Err(WorldError::ShutDown);
        }
        let order = match self.scheduler.order(&self.decls) {
            Ok(order) => order.to_vec(),
            Err(err) => {
                warn!(error = %err, "refusing to run frame");
                return Err(err);
            }
        };

        let mut profiler = std::mem::take(&mut self.profiler);
        for index in order {
            let Some(mut unit) = self.units[index].unit.take() else {
                continue;
            };
            let name = Arc::clone(&self.units[index].name);
            self.update_depth += 1;
            time_scope!(profiler, &name, {
                unit.update(self, dt);
            });
            self.update_depth -= 1;
            self.units[index].unit = Some(unit);

            if self.shut_down {
                self.profiler = profiler;
                if self.update_depth == 0 && self.teardown_pending {
                    self.teardown_pending = false;
                    self.run_shutdown_hooks();
                }
                debug!(unit = %name, frame = self.frame, "frame cut short by shutdown");
                return Err(WorldError::ShutDown);
            }
        }
        self.profiler = profiler;

        self.frame += 1;
        self.counters.increment("frames", 1);
        Ok(())
    }

    /// Run every unit's `render` hook in the same order as `run_once`.
    pub fn render(&mut self, frame: &mut FrameContext) -> Result<(), WorldError> {
        if self.shut_down {
            return Err(WorldError::ShutDown);
        }
        let order = self.scheduler.order(&self.decls)?.to_vec();
        for index in order {
            let Some(mut unit) = self.units[index].unit.take() else {
                continue;
            };
            unit.render(self, frame);
            self.units[index].unit = Some(unit);
        }
        Ok(())
    }

    /// Completed `run_once` calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Tear down: every unit's `on_shutdown` runs once, in registration
    /// order. Later calls are no-ops; later frames fail with `ShutDown`.
    ///
    /// Called from inside `update`, the hooks are deferred until the
    /// calling unit is back in its slot, so it is not skipped.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if self.update_depth > 0 {
            self.teardown_pending = true;
            return;
        }
        self.run_shutdown_hooks();
    }

    fn run_shutdown_hooks(&mut self) {
        for slot in &mut self.units {
            if let Some(unit) = slot.unit.as_deref_mut() {
                unit.on_shutdown();
            }
        }
        debug!(units = self.units.len(), frames = self.frame, "world shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Per-unit update timings.
    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    /// Lifecycle counters (`handles.created`, `handles.destroyed`, `frames`).
    pub fn counters(&self) -> &Counter {
        &self.counters
    }

    /// Short names of every component type with a store, sorted.
    pub fn component_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .stores
            .values()
            .map(|store| short_type_name(store.component_name()))
            .collect();
        names.sort();
        names
    }

    /// Number of distinct tags currently attached to any handle.
    pub fn tag_count(&self) -> usize {
        self.tags.tag_count()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}
