//! Process-wide store of admission windows.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::window::RateWindowEntry;

/// Registry of admission windows keyed by identifier.
///
/// Each shard is locked independently, so an update to one identifier is
/// atomic without serializing unrelated identifiers. Construct one per
/// service and share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct RateLimitRegistry {
    entries: DashMap<String, RateWindowEntry>,
}

impl RateLimitRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get a copy of the window stored for `identifier`.
    pub fn get(&self, identifier: &str) -> Option<RateWindowEntry> {
        self.entries.get(identifier).map(|e| *e)
    }

    /// Store a window for `identifier`, replacing any previous one.
    pub fn set(&self, identifier: &str, entry: RateWindowEntry) {
        self.entries.insert(identifier.to_string(), entry);
    }

    /// Remove the window for `identifier`.
    pub fn delete(&self, identifier: &str) -> Option<RateWindowEntry> {
        self.entries.remove(identifier).map(|(_, e)| e)
    }

    /// Lock the slot for `identifier` for a read-modify-write.
    ///
    /// The shard stays locked until the returned entry is dropped; do not hold
    /// it across an `.await`.
    pub(crate) fn entry(&self, identifier: &str) -> Entry<'_, String, RateWindowEntry> {
        self.entries.entry(identifier.to_string())
    }

    /// Remove every window that ended before `now_ms`. Returns how many were removed.
    pub fn sweep(&self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now_ms));
        before.saturating_sub(self.entries.len())
    }

    /// Get the number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifier is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all windows.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(count: u32, reset_time_ms: u64) -> RateWindowEntry {
        RateWindowEntry {
            count,
            reset_time_ms,
        }
    }

    #[test]
    fn test_set_get_delete() {
        let registry = RateLimitRegistry::new();
        assert!(registry.is_empty());

        registry.set("explanation:a", window(2, 1_000));
        assert_eq!(registry.get("explanation:a"), Some(window(2, 1_000)));
        assert_eq!(registry.len(), 1);

        registry.set("explanation:a", window(1, 2_000));
        assert_eq!(registry.get("explanation:a"), Some(window(1, 2_000)));

        assert_eq!(registry.delete("explanation:a"), Some(window(1, 2_000)));
        assert_eq!(registry.get("explanation:a"), None);
        assert_eq!(registry.delete("explanation:a"), None);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let registry = RateLimitRegistry::new();
        registry.set("old", window(10, 1_000));
        registry.set("boundary", window(1, 2_000));
        registry.set("live", window(4, 9_000));

        let removed = registry.sweep(2_000);

        assert_eq!(removed, 1);
        assert_eq!(registry.get("old"), None);
        assert!(registry.get("boundary").is_some());
        assert!(registry.get("live").is_some());
    }

    #[test]
    fn test_clear() {
        let registry = RateLimitRegistry::new();
        registry.set("a", window(1, 1));
        registry.set("b", window(1, 1));

        registry.clear();
        assert_eq!(registry.len(), 0);
    }
}
