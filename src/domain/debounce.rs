//! Edge-triggered notification state.
//!
//! One streak counter per (entity, rule). A rule notifies only on the cycle
//! where it goes from not firing to firing; while it keeps firing the streak
//! grows, and the first non-firing cycle removes the entry.

use std::collections::HashMap;

/// Entity key used for rules evaluated against the global context.
pub const GLOBAL_ENTITY: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebounceKey {
    pub entity: String,
    pub rule: String,
}

impl DebounceKey {
    pub fn new(entity: &str, rule: &str) -> Self {
        Self {
            entity: entity.to_string(),
            rule: rule.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DebounceCache {
    counters: HashMap<DebounceKey, u64>,
}

impl DebounceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one evaluation and returns whether it is a new firing.
    pub fn should_notify(&mut self, entity: &str, rule: &str, fired: bool) -> bool {
        let key = DebounceKey::new(entity, rule);
        if !fired {
            self.counters.remove(&key);
            return false;
        }
        let streak = self.counters.entry(key).or_insert(0);
        let first = *streak == 0;
        *streak = streak.saturating_add(1);
        first
    }

    /// Consecutive firing cycles recorded for the key; 0 when absent.
    pub fn streak(&self, entity: &str, rule: &str) -> u64 {
        self.counters
            .get(&DebounceKey::new(entity, rule))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
