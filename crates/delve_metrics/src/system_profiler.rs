//! Per-unit timing for scheduled systems

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated timing for one named unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemTiming {
    pub total: Duration,
    pub last: Duration,
    pub calls: u64,
}

impl SystemTiming {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

#[derive(Debug, Default)]
pub struct SystemProfiler {
    timings: BTreeMap<String, SystemTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_system<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let entry = self.timings.entry(name.to_string()).or_default();
        entry.total += elapsed;
        entry.last = elapsed;
        entry.calls += 1;
        result
    }

    pub fn get_timing(&self, name: &str) -> Duration {
        self.timings
            .get(name)
            .map(|timing| timing.total)
            .unwrap_or(Duration::ZERO)
    }

    pub fn timing(&self, name: &str) -> Option<SystemTiming> {
        self.timings.get(name).copied()
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SystemTiming)> + '_ {
        self.timings.iter().map(|(name, timing)| (name.as_str(), timing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_per_name() {
        let mut profiler = SystemProfiler::new();
        let out = profiler.time_system("movement", || 7);
        profiler.time_system("movement", || ());
        profiler.time_system("reaper", || ());

        assert_eq!(out, 7);
        assert_eq!(profiler.timing("movement").map(|t| t.calls), Some(2));
        assert_eq!(profiler.timing("reaper").map(|t| t.calls), Some(1));
        assert!(profiler.timing("absent").is_none());
        assert_eq!(profiler.iter().count(), 2);

        profiler.reset();
        assert_eq!(profiler.get_timing("movement"), Duration::ZERO);
    }
}
