// scheduler.rs - Dependency ordering for system units
//
// Builds the "runs-after" graph and linearizes it with Kahn's algorithm.
// Among ready units the lowest registration index always goes first, so
// identical registrations always produce identical orders.

use crate::ecs::{UnitId, WorldError};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// What the scheduler needs to know about one registered unit.
#[derive(Clone, Debug)]
pub(crate) struct UnitDecl {
    pub id: UnitId,
    pub runs_after: Vec<UnitId>,
}

/// Unordered (no cache) until the first frame, Ordered afterwards until the
/// next registration.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    cached: Option<Vec<usize>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_ordered(&self) -> bool {
        self.cached.is_some()
    }

    /// Cached execution order (registration indices), building it first if
    /// the unit set changed. A cycle leaves the scheduler unordered.
    pub fn order(&mut self, decls: &[UnitDecl]) -> Result<&[usize], WorldError> {
        if self.cached.is_none() {
            let order = build_order(decls)?;
            debug!(
                order = ?order
                    .iter()
                    .map(|&index| decls[index].id.to_string())
                    .collect::<Vec<_>>(),
                "system schedule built"
            );
            self.cached = Some(order);
        }
        Ok(self.cached.as_deref().unwrap_or(&[]))
    }
}

fn build_order(decls: &[UnitDecl]) -> Result<Vec<usize>, WorldError> {
    let position: HashMap<_, _> = decls
        .iter()
        .enumerate()
        .map(|(index, decl)| (decl.id.type_id(), index))
        .collect();

    let mut successors = vec![Vec::new(); decls.len()];
    let mut in_degree = vec![0usize; decls.len()];
    for (index, decl) in decls.iter().enumerate() {
        for dependency in &decl.runs_after {
            match position.get(&dependency.type_id()) {
                Some(&before) => {
                    successors[before].push(index);
                    in_degree[index] += 1;
                }
                // Unregistered targets are dropped rather than rejected.
                None => debug!(
                    unit = %decl.id,
                    missing = %dependency,
                    "dropping runs-after edge to unregistered unit"
                ),
            }
        }
    }

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(index, _)| index)
        .collect();

    let mut order = Vec::with_capacity(decls.len());
    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &next in &successors[index] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() < decls.len() {
        let units = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree > 0)
            .map(|(index, _)| decls[index].id.to_string())
            .collect();
        return Err(WorldError::DependencyCycle { units });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{SystemUnit, World};

    macro_rules! units {
        ($($name:ident),+) => {
            $(
                struct $name;
                impl SystemUnit for $name {
                    fn update(&mut self, _world: &mut World, _dt: f32) {}
                }
            )+
        };
    }

    units!(A, B, C, D, Ghost);

    fn decl<U: SystemUnit>(runs_after: Vec<UnitId>) -> UnitDecl {
        UnitDecl {
            id: UnitId::of::<U>(),
            runs_after,
        }
    }

    #[test]
    fn unconstrained_units_keep_registration_order() {
        let decls = vec![
            decl::<A>(vec![]),
            decl::<B>(vec![UnitId::of::<A>()]),
            decl::<C>(vec![]),
        ];
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.order(&decls).unwrap(), &[0, 1, 2]);
        assert!(scheduler.is_ordered());
    }

    #[test]
    fn dependencies_reorder_registration() {
        // C runs first even though it was registered last.
        let decls = vec![
            decl::<A>(vec![UnitId::of::<C>()]),
            decl::<B>(vec![UnitId::of::<A>(), UnitId::of::<C>()]),
            decl::<C>(vec![]),
            decl::<D>(vec![]),
        ];
        let order = build_order(&decls).unwrap();
        assert_eq!(order, vec![2, 0, 1, 3]);
    }

    #[test]
    fn order_is_stable_across_rebuilds() {
        let decls = vec![
            decl::<D>(vec![UnitId::of::<B>()]),
            decl::<C>(vec![]),
            decl::<B>(vec![]),
            decl::<A>(vec![UnitId::of::<C>()]),
        ];
        let first = build_order(&decls).unwrap();
        for _ in 0..10 {
            assert_eq!(build_order(&decls).unwrap(), first);
        }
        assert_eq!(first, vec![1, 2, 0, 3]);
    }

    #[test]
    fn unregistered_dependency_is_ignored() {
        let decls = vec![decl::<A>(vec![UnitId::of::<Ghost>()]), decl::<B>(vec![])];
        assert_eq!(build_order(&decls).unwrap(), vec![0, 1]);
    }

    #[test]
    fn cycle_is_reported_with_members() {
        let decls = vec![
            decl::<A>(vec![UnitId::of::<B>()]),
            decl::<B>(vec![UnitId::of::<A>()]),
            decl::<C>(vec![]),
        ];
        let mut scheduler = Scheduler::new();
        match scheduler.order(&decls) {
            Err(WorldError::DependencyCycle { units }) => {
                assert_eq!(units, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(!scheduler.is_ordered());
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let decls = vec![decl::<A>(vec![UnitId::of::<A>()])];
        assert!(matches!(
            build_order(&decls),
            Err(WorldError::DependencyCycle { .. })
        ));
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let mut decls = vec![decl::<A>(vec![])];
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.order(&decls).unwrap(), &[0]);

        decls.insert(0, decl::<B>(vec![UnitId::of::<A>()]));
        scheduler.invalidate();
        assert_eq!(scheduler.order(&decls).unwrap(), &[1, 0]);
    }
}
