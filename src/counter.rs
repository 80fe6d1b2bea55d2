//! Per-method invocation counts

use std::{collections::HashMap, sync::Mutex};

#[derive(Debug, Default)]
pub struct CallCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, method: &str) {
        let mut counts = self
            .counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }

    /// Zero for methods that were never dispatched.
    pub fn get(&self, method: &str) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn total(&self) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .sum()
    }

    pub fn reset(&self) {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}
