use std::collections::HashMap;

use serde_json::{json, Value};

/// Continuous 0..1 value scaling distortion intensity across all games.
pub const CORRUPTION: &str = "corruption";
/// Integer progression level, monotonically non-decreasing within a session.
pub const HAUNT_STAGE: &str = "haunt_stage";
/// Array of unlocked-content flags.
pub const UNLOCKED: &str = "unlocked";

/// One mutation recorded in the change journal.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub key: String,
    pub value: Value,
}

/// Frame-local copy of the haunting signals. Taken once at the top of each
/// shell frame so a game never sees a value change mid-frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HauntSnapshot {
    pub corruption: f32,
    pub haunt_stage: u32,
}

/// Process-wide progression store shared by every game in the session.
///
/// Constructed once at application start, seeded with the session defaults;
/// mutated only by designated global progression logic, read by games via
/// per-frame snapshots. Never reset between channel switches.
///
/// Every `set` is appended to a change journal the host drains once per
/// frame and republishes on the event bus.
pub struct SharedStateStore {
    values: HashMap<String, Value>,
    journal: Vec<StateChange>,
}

impl SharedStateStore {
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert(CORRUPTION.to_string(), json!(0.0));
        values.insert(HAUNT_STAGE.to_string(), json!(0));
        values.insert(UNLOCKED.to_string(), json!([]));
        Self {
            values,
            journal: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value.clone());
        self.journal.push(StateChange {
            key: key.to_string(),
            value,
        });
    }

    /// Current corruption level, clamped to 0..1.
    pub fn corruption(&self) -> f32 {
        let v = self.values.get(CORRUPTION).and_then(Value::as_f64);
        debug_assert!(v.is_some(), "corruption missing from session store");
        (v.unwrap_or(0.0) as f32).clamp(0.0, 1.0)
    }

    /// Set the corruption level. Values outside 0..1 are clamped.
    pub fn set_corruption(&mut self, level: f32) {
        self.set(CORRUPTION, json!(level.clamp(0.0, 1.0)));
    }

    /// Current haunt stage.
    pub fn haunt_stage(&self) -> u32 {
        let v = self.values.get(HAUNT_STAGE).and_then(Value::as_u64);
        debug_assert!(v.is_some(), "haunt_stage missing from session store");
        v.unwrap_or(0) as u32
    }

    /// Raise the haunt stage. Writes that would lower it are ignored:
    /// the stage only escalates within a session.
    pub fn raise_haunt_stage(&mut self, stage: u32) {
        if stage <= self.haunt_stage() {
            log::warn!(
                "ignoring haunt_stage write {} (current {})",
                stage,
                self.haunt_stage()
            );
            return;
        }
        self.set(HAUNT_STAGE, json!(stage));
    }

    /// Record an unlocked-content flag. Duplicate unlocks are no-ops.
    pub fn unlock(&mut self, flag: &str) {
        if self.is_unlocked(flag) {
            return;
        }
        let mut flags = self
            .values
            .get(UNLOCKED)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        flags.push(json!(flag));
        self.set(UNLOCKED, Value::Array(flags));
    }

    pub fn is_unlocked(&self, flag: &str) -> bool {
        self.values
            .get(UNLOCKED)
            .and_then(Value::as_array)
            .map(|flags| flags.iter().any(|f| f.as_str() == Some(flag)))
            .unwrap_or(false)
    }

    /// Copy the haunting signals for one frame.
    pub fn snapshot(&self) -> HauntSnapshot {
        HauntSnapshot {
            corruption: self.corruption(),
            haunt_stage: self.haunt_stage(),
        }
    }

    /// Drain all mutations recorded since the last drain.
    pub fn drain_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.journal)
    }
}

impl Default for SharedStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_session_defaults() {
        let store = SharedStateStore::new();
        assert_eq!(store.corruption(), 0.0);
        assert_eq!(store.haunt_stage(), 0);
        assert!(!store.is_unlocked("anything"));
    }

    #[test]
    fn corruption_clamps() {
        let mut store = SharedStateStore::new();
        store.set_corruption(3.0);
        assert_eq!(store.corruption(), 1.0);
        store.set_corruption(-1.0);
        assert_eq!(store.corruption(), 0.0);
    }

    #[test]
    fn haunt_stage_is_monotonic() {
        let mut store = SharedStateStore::new();
        store.raise_haunt_stage(2);
        assert_eq!(store.haunt_stage(), 2);
        store.raise_haunt_stage(1);
        assert_eq!(store.haunt_stage(), 2);
        store.raise_haunt_stage(2);
        assert_eq!(store.haunt_stage(), 2);
    }

    #[test]
    fn sets_are_journaled_once() {
        let mut store = SharedStateStore::new();
        store.set_corruption(0.5);
        let changes = store.drain_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, CORRUPTION);
        assert!(store.drain_changes().is_empty());
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut store = SharedStateStore::new();
        store.unlock("midnight_channel");
        store.unlock("midnight_channel");
        assert!(store.is_unlocked("midnight_channel"));
        assert_eq!(store.drain_changes().len(), 1);
    }

    #[test]
    fn snapshot_is_stable_against_later_writes() {
        let mut store = SharedStateStore::new();
        let snap = store.snapshot();
        store.set_corruption(0.9);
        assert_eq!(snap.corruption, 0.0);
    }
}
