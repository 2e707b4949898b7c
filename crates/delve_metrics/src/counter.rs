//! Named event counters

use std::collections::BTreeMap;

/// Monotonic named counters keyed by static labels.
///
/// Iteration is in label order so dumps are stable between runs.
#[derive(Debug, Default)]
pub struct Counter {
    counters: BTreeMap<&'static str, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &'static str, value: u64) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    pub fn set(&mut self, name: &'static str, value: u64) {
        self.counters.insert(name, value);
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counters.iter().map(|(name, value)| (*name, *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_iterate_in_order() {
        let mut counter = Counter::new();
        counter.increment("handles.destroyed", 1);
        counter.increment("handles.created", 2);
        counter.increment("handles.created", 3);

        assert_eq!(counter.get("handles.created"), 5);
        assert_eq!(counter.get("missing"), 0);

        let names: Vec<_> = counter.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["handles.created", "handles.destroyed"]);

        counter.reset_all();
        assert_eq!(counter.get("handles.created"), 0);
    }
}
