//! Feedback cache keyed by (exercise type, stage, rep count)
//!
//! Joint angles and timestamps are not part of the key, so two frames in the
//! same (stage, rep) bucket share one piece of feedback. An optional capacity
//! turns the cache into an LRU; without one it grows for the process lifetime.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::ExerciseType;

/// Feedback signature used as the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedbackKey {
    pub exercise: ExerciseType,
    pub stage: String,
    pub rep_count: u32,
}

impl FeedbackKey {
    pub fn new(exercise: ExerciseType, stage: impl Into<String>, rep_count: u32) -> Self {
        Self {
            exercise,
            stage: stage.into(),
            rep_count,
        }
    }

    /// Flat string form, e.g. `squat_down_3`
    pub fn signature(&self) -> String {
        format!("{}_{}_{}", self.exercise, self.stage, self.rep_count)
    }
}

struct CacheEntry {
    text: String,
    last_used: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<FeedbackKey, CacheEntry>,
    tick: u64,
}

impl CacheInner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Thread-safe feedback cache.
///
/// Racing writers on the same key are allowed; the last store wins.
pub struct FeedbackCache {
    inner: Mutex<CacheInner>,
    capacity: Option<usize>,
}

impl FeedbackCache {
    /// `None` keeps every entry; `Some(n)` evicts the least recently used
    /// entry once more than `n` keys are held.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: capacity.filter(|n| *n > 0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Build from the config value where `0` means unbounded
    pub fn with_capacity_setting(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn lookup(&self, key: &FeedbackKey) -> Option<String> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let tick = inner.next_tick();
        inner.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.text.clone()
        })
    }

    pub fn store(&self, key: FeedbackKey, text: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let tick = inner.next_tick();
        inner.entries.insert(
            key,
            CacheEntry {
                text: text.into(),
                last_used: tick,
            },
        );

        if let Some(capacity) = self.capacity {
            while inner.entries.len() > capacity {
                let oldest = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        inner.entries.remove(&k);
                    }
                    None => break,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FeedbackCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(stage: &str, rep: u32) -> FeedbackKey {
        FeedbackKey::new(ExerciseType::Squat, stage, rep)
    }

    #[test]
    fn test_signature_format() {
        let k = FeedbackKey::new(ExerciseType::ShoulderRaise, "up", 4);
        assert_eq!(k.signature(), "shoulder_raise_up_4");
    }

    #[test]
    fn test_store_then_lookup() {
        let cache = FeedbackCache::unbounded();
        assert!(cache.lookup(&key("down", 1)).is_none());
        cache.store(key("down", 1), "Nice depth");
        assert_eq!(cache.lookup(&key("down", 1)).as_deref(), Some("Nice depth"));
        assert!(cache.lookup(&key("up", 1)).is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = FeedbackCache::unbounded();
        cache.store(key("down", 1), "first");
        cache.store(key("down", 1), "second");
        assert_eq!(cache.lookup(&key("down", 1)).as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = FeedbackCache::new(Some(2));
        cache.store(key("down", 1), "a");
        cache.store(key("down", 2), "b");
        // Touch the first entry so the second becomes least recently used
        assert!(cache.lookup(&key("down", 1)).is_some());
        cache.store(key("down", 3), "c");

        assert_eq!(cache.len(), 2);
        assert!(cache.lookup(&key("down", 1)).is_some());
        assert!(cache.lookup(&key("down", 2)).is_none());
        assert!(cache.lookup(&key("down", 3)).is_some());
    }

    #[test]
    fn test_zero_capacity_means_unbounded() {
        let cache = FeedbackCache::with_capacity_setting(0);
        assert!(cache.capacity().is_none());
        for rep in 0..50 {
            cache.store(key("up", rep), "ok");
        }
        assert_eq!(cache.len(), 50);
    }

    #[test]
    fn test_concurrent_writers_on_distinct_keys() {
        let cache = Arc::new(FeedbackCache::unbounded());
        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for rep in 0..100u32 {
                        cache.store(key(&format!("stage{t}"), rep), format!("{t}-{rep}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cache.len(), 800);
        for t in 0..8u32 {
            assert_eq!(
                cache.lookup(&key(&format!("stage{t}"), 99)),
                Some(format!("{t}-99"))
            );
        }
    }
}
