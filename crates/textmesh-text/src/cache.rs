//! Measurement cache for auto-fit probes.
//!
//! Auto-fit runs several measurement passes per layout, and a label that is laid out again
//! with the same text and container repeats the exact same probes. Results are keyed by the
//! text hash, the probed font size and the exact wrap width.

use std::sync::Arc;

use textmesh_core::alloc::HashMap;

/// Key for one measurement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureKey {
    /// Hash of the stream text. Hits are confirmed against the stored text.
    pub text_hash: u64,
    /// Bits of the probed font size.
    pub font_size_bits: u32,
    /// Bits of the wrap width, `None` without wrapping.
    pub wrap_width_bits: Option<u32>,
}

impl MeasureKey {
    pub fn new(text: &str, font_size: f32, wrap_width: Option<f32>) -> Self {
        Self {
            text_hash: fxhash::hash64(text),
            font_size_bits: font_size.to_bits(),
            wrap_width_bits: wrap_width.map(f32::to_bits),
        }
    }
}

/// Size of a measured block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measured {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
struct Entry {
    text: Arc<str>,
    measured: Measured,
}

/// Cache of measurement results.
///
/// Slot sizes and styles are not part of the key; owners clear the cache when either changes.
#[derive(Debug, Default)]
pub struct MeasureCache {
    cache: HashMap<MeasureKey, Entry>,
    pub hits: u64,
    pub misses: u64,
}

impl MeasureCache {
    pub fn new() -> Self {
        Self {
            cache: HashMap::with_capacity(32),
            hits: 0,
            misses: 0,
        }
    }

    /// Get a cached result or compute and store it.
    ///
    /// `text` must be the text `key` was built from. An entry stored for a different text
    /// under the same hash is replaced.
    pub fn get_or_measure<F>(&mut self, text: &Arc<str>, key: MeasureKey, measure: F) -> Measured
    where
        F: FnOnce() -> Measured,
    {
        if let Some(entry) = self.cache.get(&key) {
            if *entry.text == **text {
                self.hits += 1;
                return entry.measured;
            }
            tracing::trace!("Measure cache hash collision, replacing entry");
        }
        self.misses += 1;
        let measured = measure();
        self.cache.insert(
            key,
            Entry {
                text: Arc::clone(text),
                measured,
            },
        );
        measured
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats_string(&self) -> String {
        format!(
            "MeasureCache: {} entries, {:.1}% hit rate ({} hits, {} misses)",
            self.len(),
            self.hit_rate() * 100.0,
            self.hits,
            self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = MeasureCache::new();
        let hello = text("hello");
        let key = MeasureKey::new(&hello, 18.0, Some(100.0));
        let mut calls = 0;

        for _ in 0..3 {
            let measured = cache.get_or_measure(&hello, key, || {
                calls += 1;
                Measured { width: 50.0, height: 18.0 }
            });
            assert_eq!(measured.width, 50.0);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.hits, 2);
        assert_eq!(cache.misses, 1);
        assert!((cache.hit_rate() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_keys() {
        let a = MeasureKey::new("hello", 18.0, Some(100.4));
        assert_eq!(a, MeasureKey::new("hello", 18.0, Some(100.4)));
        assert_ne!(a, MeasureKey::new("hello", 18.0, Some(99.6)));
        assert_ne!(a, MeasureKey::new("hello", 18.5, Some(100.4)));
        assert_ne!(a, MeasureKey::new("hellO", 18.0, Some(100.4)));
        assert_ne!(
            MeasureKey::new("x", 18.0, Some(0.0)),
            MeasureKey::new("x", 18.0, None)
        );
    }

    #[test]
    fn test_colliding_hash_is_a_miss() {
        let mut cache = MeasureCache::new();
        let first = text("first");
        let second = text("second");
        // Both texts forced under the same key.
        let key = MeasureKey::new(&first, 10.0, None);

        cache.get_or_measure(&first, key, || Measured { width: 1.0, height: 1.0 });
        let measured = cache.get_or_measure(&second, key, || Measured { width: 2.0, height: 2.0 });

        assert_eq!(measured.width, 2.0);
        assert_eq!(cache.misses, 2);
        assert_eq!(cache.hits, 0);
    }

    #[test]
    fn test_clear_resets_stats() {
        let mut cache = MeasureCache::new();
        let a = text("a");
        cache.get_or_measure(&a, MeasureKey::new(&a, 1.0, None), Measured::default);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.misses, 0);
    }
}
