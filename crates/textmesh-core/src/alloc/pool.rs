use crate::profiling::profile_function;
use std::num::NonZeroU64;

/// Values that can be returned to a [`Pool`] and handed out again.
pub trait Reusable: Default {
    /// Clear per-use state. Allocations (e.g. `Vec` capacity) may be kept.
    fn reset(&mut self);
}

/// A packed `(generation, index)` pair identifying something produced during one pool
/// generation.
///
/// Once the pool is recycled, stamps from older generations are rejected by
/// [`Pool::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(NonZeroU64);

impl Stamp {
    pub fn new(generation: u32, index: u32) -> Self {
        let packed = ((generation as u64) << 32) | index as u64;
        Self(NonZeroU64::MIN.saturating_add(packed))
    }

    pub fn generation(&self) -> u32 {
        ((self.0.get() - 1) >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        ((self.0.get() - 1) & u32::MAX as u64) as u32
    }
}

/// Free list of reusable values.
///
/// Items are moved out with [`acquire`](Pool::acquire) and handed back with
/// [`release`](Pool::release) or all at once with [`recycle`](Pool::recycle), which also
/// advances the generation.
pub struct Pool<T> {
    free: Vec<T>,
    max_free: usize,
    generation: u32,
    outstanding: usize,
}

impl<T: Reusable> Pool<T> {
    pub const fn new() -> Self {
        Self::with_max_free(usize::MAX)
    }

    /// A pool that drops released values once `max_free` are already waiting.
    pub const fn with_max_free(max_free: usize) -> Self {
        Self {
            free: Vec::new(),
            max_free,
            generation: 0,
            outstanding: 0,
        }
    }

    pub fn acquire(&mut self) -> T {
        profile_function!();
        self.outstanding += 1;
        self.free.pop().unwrap_or_default()
    }

    pub fn release(&mut self, mut item: T) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.free.len() >= self.max_free {
            return;
        }
        item.reset();
        self.free.push(item);
    }

    /// Release every item and start a new generation.
    pub fn recycle<I: IntoIterator<Item = T>>(&mut self, items: I) -> u32 {
        profile_function!();
        for item in items {
            self.release(item);
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn stamp(&self, index: u32) -> Stamp {
        Stamp::new(self.generation, index)
    }

    pub fn is_current(&self, stamp: Stamp) -> bool {
        stamp.generation() == self.generation
    }

    /// Number of values waiting to be reused.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of values acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl<T: Reusable> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Scratch {
        data: Vec<u8>,
    }

    impl Reusable for Scratch {
        fn reset(&mut self) {
            self.data.clear();
        }
    }

    #[test]
    fn test_stamp_roundtrip() {
        let stamp = Stamp::new(7, 42);
        assert_eq!(stamp.generation(), 7);
        assert_eq!(stamp.index(), 42);
        assert_eq!(std::mem::size_of::<Stamp>(), std::mem::size_of::<Option<Stamp>>());
    }

    #[test]
    fn test_release_keeps_capacity() {
        let mut pool = Pool::<Scratch>::new();
        let mut item = pool.acquire();
        item.data.extend_from_slice(&[1, 2, 3]);
        pool.release(item);
        assert_eq!(pool.free_len(), 1);

        let reused = pool.acquire();
        assert!(reused.data.is_empty());
        assert!(reused.data.capacity() >= 3);
        assert_eq!(pool.outstanding(), 1);
    }

    #[test]
    fn test_recycle_invalidates_stamps() {
        let mut pool = Pool::<Scratch>::new();
        let items: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        let stamp = pool.stamp(2);
        assert!(pool.is_current(stamp));

        pool.recycle(items);
        assert!(!pool.is_current(stamp));
        assert_eq!(pool.free_len(), 4);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_max_free() {
        let mut pool = Pool::<Scratch>::with_max_free(1);
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.free_len(), 1);
    }
}
