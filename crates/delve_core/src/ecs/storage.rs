// storage.rs - Sparse-set component storage
//
// One store per component type. `sparse` maps a handle index to its dense
// slot, `dense` holds the values packed for cache-friendly iteration, and
// `dense_to_index` maps each slot back to its owning handle index.

use crate::ecs::component::{Component, ComponentStore};
use std::any::{type_name, Any};

/// Sentinel in `sparse` for "no component at this index".
const ABSENT: i32 = -1;

/// Sparse-set storage for a single component type.
///
/// Invariants:
/// - `dense.len() == dense_to_index.len()`
/// - for every slot `s`, `sparse[dense_to_index[s]] == s`
///
/// Removal swaps the last slot into the hole, so dense order only matches
/// insertion order between structural changes.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    sparse: Vec<i32>,
    dense: Vec<T>,
    dense_to_index: Vec<u32>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            dense_to_index: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    #[inline]
    fn slot_of(&self, index: u32) -> Option<usize> {
        match self.sparse.get(index as usize) {
            Some(&slot) if slot != ABSENT => Some(slot as usize),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.slot_of(index).is_some()
    }

    /// Insert or overwrite the value for `index`, returning the old value.
    pub fn insert(&mut self, index: u32, value: T) -> Option<T> {
        if let Some(slot) = self.slot_of(index) {
            return Some(std::mem::replace(&mut self.dense[slot], value));
        }

        let at = index as usize;
        if at >= self.sparse.len() {
            self.sparse.resize(at + 1, ABSENT);
        }
        self.sparse[at] = self.dense.len() as i32;
        self.dense.push(value);
        self.dense_to_index.push(index);
        None
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.slot_of(index).map(|slot| &self.dense[slot])
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slot_of(index).map(move |slot| &mut self.dense[slot])
    }

    /// Swap-remove the value for `index`.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let slot = self.slot_of(index)?;
        let last = self.dense.len() - 1;
        if slot != last {
            let moved = self.dense_to_index[last];
            self.sparse[moved as usize] = slot as i32;
        }
        self.sparse[index as usize] = ABSENT;
        self.dense_to_index.swap_remove(slot);
        Some(self.dense.swap_remove(slot))
    }

    /// Handle indices in dense slot order.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.dense_to_index
    }

    /// Packed values in dense slot order.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.dense_to_index.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.dense_to_index.iter().copied().zip(self.dense.iter_mut())
    }

    /// Verify the sparse/dense cross-mapping. Used by tests and debug checks.
    pub fn check_invariants(&self) -> bool {
        if self.dense.len() != self.dense_to_index.len() {
            return false;
        }
        let mapped_forward = self
            .dense_to_index
            .iter()
            .enumerate()
            .all(|(slot, &index)| self.slot_of(index) == Some(slot));
        let occupied = self.sparse.iter().filter(|&&slot| slot != ABSENT).count();
        mapped_forward && occupied == self.dense.len()
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStore for SparseSet<T> {
    fn contains(&self, index: u32) -> bool {
        SparseSet::contains(self, index)
    }

    fn remove_index(&mut self, index: u32) -> bool {
        self.remove(index).is_some()
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn indices(&self) -> &[u32] {
        SparseSet::indices(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_and_overwrite() {
        let mut set = SparseSet::new();
        assert_eq!(set.insert(7, "seven"), None);
        assert_eq!(set.insert(2, "two"), None);
        assert_eq!(set.insert(7, "SEVEN"), Some("seven"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(7), Some(&"SEVEN"));
        assert_eq!(set.get(3), None);
        assert_eq!(set.get(1000), None);
        assert_eq!(set.indices(), &[7, 2]);
        assert!(set.check_invariants());
    }

    #[test]
    fn swap_remove_relocates_last_slot() {
        let mut set = SparseSet::new();
        for index in 1..=4u32 {
            set.insert(index, index * 10);
        }

        assert_eq!(set.remove(2), Some(20));
        // slot of index 2 is now held by the old last entry (index 4)
        assert_eq!(set.indices(), &[1, 4, 3]);
        assert_eq!(set.get(4), Some(&40));
        assert!(!set.contains(2));
        assert_eq!(set.remove(2), None);
        assert!(set.check_invariants());

        assert_eq!(set.remove(3), Some(30));
        assert_eq!(set.remove(1), Some(10));
        assert_eq!(set.remove(4), Some(40));
        assert!(set.is_empty());
        assert!(set.check_invariants());
    }

    #[test]
    fn invariants_hold_across_mixed_operations() {
        let mut set = SparseSet::new();
        // Deterministic pseudo-random walk over a small index range.
        let mut seed = 0x2545_f491u32;
        for step in 0..500u32 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let index = 1 + seed % 32;
            if seed % 3 == 0 {
                set.remove(index);
            } else {
                set.insert(index, step);
            }
            assert!(set.check_invariants(), "broken after step {step}");
        }
        for (index, value) in set.iter() {
            assert_eq!(set.get(index), Some(value));
        }
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut set = SparseSet::new();
        set.insert(3, 1);
        set.insert(9, 2);
        for (_, value) in set.iter_mut() {
            *value *= 100;
        }
        assert_eq!(set.values(), &[100, 200]);
    }
}
