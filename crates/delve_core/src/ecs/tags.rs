//! Bidirectional tag membership index.
//!
//! Tags are plain strings attached to handle indices. Both directions
//! (`tag -> indices` and `index -> tags`) are updated inside the same call,
//! so the two maps can never drift apart.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default)]
pub(crate) struct TagIndex {
    by_tag: HashMap<String, BTreeSet<u32>>,
    by_index: HashMap<u32, BTreeSet<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the tag was newly attached.
    pub fn insert(&mut self, index: u32, tag: &str) -> bool {
        let added = self
            .by_tag
            .entry(tag.to_owned())
            .or_default()
            .insert(index);
        if added {
            self.by_index
                .entry(index)
                .or_default()
                .insert(tag.to_owned());
        }
        added
    }

    /// Returns `true` if the tag was attached before the call.
    pub fn remove(&mut self, index: u32, tag: &str) -> bool {
        let Some(members) = self.by_tag.get_mut(tag) else {
            return false;
        };
        if !members.remove(&index) {
            return false;
        }
        if members.is_empty() {
            self.by_tag.remove(tag);
        }
        if let Some(tags) = self.by_index.get_mut(&index) {
            tags.remove(tag);
            if tags.is_empty() {
                self.by_index.remove(&index);
            }
        }
        true
    }

    /// Detach every tag from `index`. Returns how many were removed.
    pub fn purge(&mut self, index: u32) -> usize {
        let Some(tags) = self.by_index.remove(&index) else {
            return 0;
        };
        for tag in &tags {
            if let Some(members) = self.by_tag.get_mut(tag) {
                members.remove(&index);
                if members.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }
        tags.len()
    }

    pub fn contains(&self, index: u32, tag: &str) -> bool {
        self.by_tag
            .get(tag)
            .is_some_and(|members| members.contains(&index))
    }

    /// Indices carrying `tag`, in ascending order.
    pub fn indices(&self, tag: &str) -> impl Iterator<Item = u32> + '_ {
        self.by_tag
            .get(tag)
            .into_iter()
            .flat_map(|members| members.iter().copied())
    }

    /// Tags attached to `index`, in lexical order.
    pub fn tags_of(&self, index: u32) -> impl Iterator<Item = &str> + '_ {
        self.by_index
            .get(&index)
            .into_iter()
            .flat_map(|tags| tags.iter().map(String::as_str))
    }

    /// Number of distinct tags in use.
    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let forward = self.by_tag.iter().all(|(tag, members)| {
            !members.is_empty()
                && members.iter().all(|index| {
                    self.by_index
                        .get(index)
                        .is_some_and(|tags| tags.contains(tag))
                })
        });
        let backward = self.by_index.iter().all(|(index, tags)| {
            !tags.is_empty() && tags.iter().all(|tag| self.contains(*index, tag))
        });
        forward && backward
    }
}
