// query.rs - Multi-type handle queries
//
// A query intersects several component stores. The smallest store drives
// the iteration and every other store is only probed with O(1) membership
// checks, so the cost is bounded by the smallest store, not the product.

use crate::ecs::component::{Component, ComponentStore};
use crate::ecs::Handle;
use std::any::TypeId;
use std::collections::HashMap;
use std::iter::FusedIterator;

pub(crate) type StoreMap = HashMap<TypeId, Box<dyn ComponentStore>>;

mod sealed {
    pub trait Sealed {}
}

/// Tuples of component types accepted by `World::query`.
///
/// Implemented for `(A,)` through `(A, B, C, D, E, F)`. The trait is sealed.
pub trait QueryParams: sealed::Sealed + 'static {
    #[doc(hidden)]
    fn component_ids() -> Vec<TypeId>;
}

macro_rules! impl_query_params {
    ($($name:ident),+) => {
        impl<$($name: Component),+> sealed::Sealed for ($($name,)+) {}

        impl<$($name: Component),+> QueryParams for ($($name,)+) {
            fn component_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }
        }
    };
}

impl_query_params!(A);
impl_query_params!(A, B);
impl_query_params!(A, B, C);
impl_query_params!(A, B, C, D);
impl_query_params!(A, B, C, D, E);
impl_query_params!(A, B, C, D, E, F);

/// Lazy iterator over live handles that carry every queried component.
///
/// Borrows the World immutably, so stores cannot change shape while it is
/// alive. Collect it first when handles need to be mutated or destroyed.
pub struct QueryIter<'w> {
    driver: std::slice::Iter<'w, u32>,
    filters: Vec<&'w dyn ComponentStore>,
    generations: &'w [u32],
}

impl<'w> QueryIter<'w> {
    pub(crate) fn new(stores: &'w StoreMap, ids: &[TypeId], generations: &'w [u32]) -> Self {
        let mut selected: Vec<&'w dyn ComponentStore> = Vec::with_capacity(ids.len());
        for id in ids {
            match stores.get(id) {
                Some(store) => selected.push(&**store),
                // A type that was never attached matches nothing.
                None => return Self::empty(generations),
            }
        }

        let smallest = selected
            .iter()
            .enumerate()
            .min_by_key(|(_, store)| store.len())
            .map(|(position, _)| position);
        let Some(smallest) = smallest else {
            return Self::empty(generations);
        };

        let driver = selected.swap_remove(smallest);
        Self {
            driver: driver.indices().iter(),
            filters: selected,
            generations,
        }
    }

    fn empty(generations: &'w [u32]) -> Self {
        let nothing: &'static [u32] = &[];
        Self {
            driver: nothing.iter(),
            filters: Vec::new(),
            generations,
        }
    }
}

impl Iterator for QueryIter<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        loop {
            let index = *self.driver.next()?;
            if self.filters.iter().all(|store| store.contains(index)) {
                return Some(Handle::new(index, self.generations[index as usize]));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self.driver.len();
        if self.filters.is_empty() {
            (upper, Some(upper))
        } else {
            (0, Some(upper))
        }
    }
}

impl FusedIterator for QueryIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::storage::SparseSet;

    struct Health;
    struct Armor;
    struct Poisoned;

    fn store_map() -> StoreMap {
        let mut health = SparseSet::new();
        let mut armor = SparseSet::new();
        for index in 1..=6u32 {
            health.insert(index, Health);
        }
        armor.insert(2, Armor);
        armor.insert(5, Armor);
        armor.insert(7, Armor);

        let mut stores: StoreMap = HashMap::new();
        stores.insert(TypeId::of::<Health>(), Box::new(health));
        stores.insert(TypeId::of::<Armor>(), Box::new(armor));
        stores
    }

    #[test]
    fn smallest_store_drives_intersection() {
        let stores = store_map();
        let generations = vec![0u32; 8];
        let ids = <(Health, Armor)>::component_ids();
        let iter = QueryIter::new(&stores, &ids, &generations);
        // Armor (3 entries) drives, not Health (6 entries).
        assert_eq!(iter.size_hint(), (0, Some(3)));
        let found: Vec<u32> = iter.map(|handle| handle.index()).collect();
        assert_eq!(found, vec![2, 5]);
    }

    #[test]
    fn missing_store_yields_nothing() {
        let stores = store_map();
        let generations = vec![0u32; 8];
        let ids = <(Health, Poisoned)>::component_ids();
        assert_eq!(QueryIter::new(&stores, &ids, &generations).count(), 0);
    }

    #[test]
    fn single_type_query_reports_exact_size() {
        let stores = store_map();
        let generations = vec![4u32; 8];
        let ids = <(Health,)>::component_ids();
        let iter = QueryIter::new(&stores, &ids, &generations);
        assert_eq!(iter.size_hint(), (6, Some(6)));
        let handles: Vec<Handle> = iter.collect();
        assert_eq!(handles.len(), 6);
        assert!(handles.iter().all(|handle| handle.generation() == 4));
    }
}
