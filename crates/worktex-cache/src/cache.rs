//! Reference-counted buffer cache with source deduplication.
//!
//! [`BufferCache`] owns every [`PixelBuffer`] of a pipeline run. Buffers
//! live in an arena of slots, each with an explicit reference count;
//! callers hold [`BufferKey`]s (usually wrapped in a
//! [`WorkingTexture`](crate::WorkingTexture)).
//!
//! Buffers decoded from an external asset are indexed by [`SourceId`], so
//! loading the same asset twice shares one buffer. Fresh and duplicated
//! buffers are never indexed.
//!
//! # Invariants
//!
//! - A slot's `refs` equals the number of outstanding acquisitions.
//! - A buffer is destroyed, and its index entry removed, exactly when
//!   `refs` drops to zero.
//! - The index holds at most one buffer per source. A buffer's identity
//!   never changes, so an exclusive writer keeps its index entry.
//!
//! # Example
//!
//! ```ignore
//! use worktex_cache::BufferCache;
//! use worktex_core::TextureFormat;
//!
//! let cache = BufferCache::new();
//! let key = cache.acquire_fresh(TextureFormat::Rgba32, 64, 64, true)?;
//! assert_eq!(cache.ref_count(key), 1);
//! cache.release(key);
//! assert_eq!(cache.live_buffers(), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};
use worktex_core::{BufferId, PixelBuffer, SourceId, TextureFormat};
use worktex_io::{DecodedImage, IoResult};

use crate::TextureResult;

/// Handle to one slot of the cache arena.
///
/// The generation makes keys of destroyed buffers detectable even after
/// their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferKey {
    index: u32,
    generation: u32,
}

impl BufferKey {
    /// Arena slot index.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Source loads served from the index.
    pub hits: u64,
    /// Source loads that ran the decoder.
    pub misses: u64,
    /// Fresh allocations.
    pub fresh: u64,
    /// Copies made for copy-on-write or explicit duplication.
    pub duplicates: u64,
    /// Buffers destroyed after their last release.
    pub destroyed: u64,
    /// Buffers currently alive.
    pub live: usize,
    /// Highest number of simultaneously live buffers.
    pub peak_live: usize,
}

impl CacheStats {
    /// Source hit rate as percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// A live buffer and its reference count.
struct Slot {
    buffer: PixelBuffer,
    refs: usize,
}

struct SlotEntry {
    generation: u32,
    slot: Option<Slot>,
}

/// Arena, free list and source index. Guarded by the cache mutex.
#[derive(Default)]
pub(crate) struct CacheState {
    entries: Vec<SlotEntry>,
    free: Vec<u32>,
    by_source: HashMap<SourceId, BufferKey>,
    stats: CacheStats,
}

impl CacheState {
    fn insert(&mut self, buffer: PixelBuffer) -> BufferKey {
        let slot = Some(Slot { buffer, refs: 1 });
        let key = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.slot = slot;
                BufferKey {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                let Ok(index) = u32::try_from(self.entries.len()) else {
                    panic!("buffer arena exhausted");
                };
                self.entries.push(SlotEntry { generation: 0, slot });
                BufferKey { index, generation: 0 }
            }
        };
        self.stats.live += 1;
        self.stats.peak_live = self.stats.peak_live.max(self.stats.live);
        key
    }

    fn get(&self, key: BufferKey) -> Option<&Slot> {
        self.entries
            .get(key.index as usize)
            .filter(|e| e.generation == key.generation)
            .and_then(|e| e.slot.as_ref())
    }

    fn get_mut(&mut self, key: BufferKey) -> Option<&mut Slot> {
        self.entries
            .get_mut(key.index as usize)
            .filter(|e| e.generation == key.generation)
            .and_then(|e| e.slot.as_mut())
    }

    fn slot(&self, key: BufferKey) -> &Slot {
        match self.get(key) {
            Some(slot) => slot,
            None => panic!("use of released buffer {:?}", key),
        }
    }

    fn slot_mut(&mut self, key: BufferKey) -> &mut Slot {
        match self.get_mut(key) {
            Some(slot) => slot,
            None => panic!("use of released buffer {:?}", key),
        }
    }

    pub(crate) fn slot_refs(&self, key: BufferKey) -> usize {
        self.slot(key).refs
    }

    pub(crate) fn buffer(&self, key: BufferKey) -> &PixelBuffer {
        &self.slot(key).buffer
    }

    pub(crate) fn buffer_mut(&mut self, key: BufferKey) -> &mut PixelBuffer {
        &mut self.slot_mut(key).buffer
    }

    /// Destination buffer mutably and source buffer shared, from distinct slots.
    pub(crate) fn pair_mut(&mut self, dst: BufferKey, src: BufferKey) -> (&mut PixelBuffer, &PixelBuffer) {
        assert_ne!(dst.index, src.index, "pair_mut on a single slot");
        // validate both keys before splitting
        self.slot(src);
        self.slot(dst);
        let (d, s) = (dst.index as usize, src.index as usize);
        let (dst_entry, src_entry) = if d < s {
            let (lo, hi) = self.entries.split_at_mut(s);
            (&mut lo[d], &hi[0])
        } else {
            let (lo, hi) = self.entries.split_at_mut(d);
            (&mut hi[0], &lo[s])
        };
        match (dst_entry.slot.as_mut(), src_entry.slot.as_ref()) {
            (Some(d), Some(s)) => (&mut d.buffer, &s.buffer),
            _ => unreachable!("slots validated above"),
        }
    }

    pub(crate) fn add(&mut self, buffer: PixelBuffer) -> BufferKey {
        self.stats.fresh += 1;
        self.insert(buffer)
    }

    fn add_ref(&mut self, key: BufferKey) {
        self.slot_mut(key).refs += 1;
    }

    fn release(&mut self, key: BufferKey) {
        let Some(slot) = self.get_mut(key) else {
            panic!("double release of buffer {:?}", key);
        };
        slot.refs -= 1;
        if slot.refs > 0 {
            return;
        }

        let entry = &mut self.entries[key.index as usize];
        let Some(slot) = entry.slot.take() else {
            unreachable!("slot checked above");
        };
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(key.index);

        if let Some(source) = slot.buffer.source() {
            if self.by_source.get(&source) == Some(&key) {
                self.by_source.remove(&source);
            }
        }
        self.stats.live -= 1;
        self.stats.destroyed += 1;
        debug!(id = %slot.buffer.id(), name = slot.buffer.name(), "buffer destroyed");
    }

    fn duplicate(&mut self, key: BufferKey) -> BufferKey {
        let copy = self.buffer(key).duplicate();
        self.stats.duplicates += 1;
        self.insert(copy)
    }

    /// Makes `key` safe to write through, returning the key to write to.
    ///
    /// Shared buffers are duplicated and the old reference released; an
    /// exclusive buffer is written in place.
    pub(crate) fn make_writable(&mut self, key: BufferKey) -> BufferKey {
        if self.slot(key).refs <= 1 {
            return key;
        }
        let copy = self.duplicate(key);
        self.release(key);
        trace!(from = ?key, to = ?copy, "copy-on-write");
        copy
    }
}

/// Shared, explicitly constructed buffer cache.
///
/// Cloning a `BufferCache` clones the handle, not the contents: all clones
/// see the same buffers. Every acquire/release/duplicate and every
/// copy-on-write check-then-write runs under a single lock acquisition.
#[derive(Clone, Default)]
pub struct BufferCache {
    state: Arc<Mutex<CacheState>>,
}

impl BufferCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles refer to the same cache.
    pub fn same_cache(&self, other: &BufferCache) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Acquires the buffer for `source`, decoding it on first use.
    ///
    /// If `source` is indexed, the existing buffer gains a reference and
    /// `decode` is not called. Otherwise `decode` runs (without the cache
    /// lock held), the result becomes a new indexed buffer with one
    /// reference.
    ///
    /// # Errors
    ///
    /// - Decode errors are returned unchanged; nothing is created.
    /// - [`SizeMismatch`](worktex_core::Error::SizeMismatch) if the decoded
    ///   sample count differs from `width * height`; nothing is registered.
    pub fn acquire_from_source<F>(&self, source: SourceId, decode: F) -> TextureResult<BufferKey>
    where
        F: FnOnce() -> IoResult<DecodedImage>,
    {
        if let Some(key) = self.lookup_source(&source) {
            return Ok(key);
        }

        let image = decode()?;
        let mut buffer = PixelBuffer::from_source(
            source,
            image.samples,
            image.width,
            image.height,
            image.format,
            image.linear,
            image.wrap_mode,
        )?;
        if let Some(name) = image.name {
            buffer.set_name(name);
        }

        let mut state = self.lock();
        // another caller may have loaded the same source meanwhile
        if let Some(&key) = state.by_source.get(&source) {
            state.add_ref(key);
            state.stats.hits += 1;
            return Ok(key);
        }
        debug!(%source, width = image.width, height = image.height, "source loaded");
        let key = state.insert(buffer);
        state.by_source.insert(source, key);
        state.stats.misses += 1;
        Ok(key)
    }

    fn lookup_source(&self, source: &SourceId) -> Option<BufferKey> {
        let mut state = self.lock();
        let key = *state.by_source.get(source)?;
        state.add_ref(key);
        state.stats.hits += 1;
        trace!(%source, "source cache hit");
        Some(key)
    }

    /// Creates a new zeroed, unindexed buffer with one reference.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDimensions`](worktex_core::Error::InvalidDimensions)
    /// if either dimension is zero.
    pub fn acquire_fresh(
        &self,
        format: TextureFormat,
        width: u32,
        height: u32,
        linear: bool,
    ) -> TextureResult<BufferKey> {
        let buffer = PixelBuffer::new(format, width, height, linear)?;
        Ok(self.lock().add(buffer))
    }

    /// Copies the buffer behind `key` into a new unindexed buffer with one
    /// reference. The original keeps its references.
    ///
    /// # Panics
    ///
    /// Panics if `key` was already released.
    pub fn acquire_duplicate(&self, key: BufferKey) -> BufferKey {
        self.lock().duplicate(key)
    }

    /// Adds a reference to a live buffer.
    ///
    /// # Panics
    ///
    /// Panics if `key` was already released.
    pub fn add_ref(&self, key: BufferKey) {
        self.lock().add_ref(key);
    }

    /// Drops one reference; the last release destroys the buffer and
    /// removes it from the source index.
    ///
    /// # Panics
    ///
    /// Releasing a buffer whose count already reached zero is a logic
    /// error in the caller and panics.
    pub fn release(&self, key: BufferKey) {
        self.lock().release(key);
    }

    /// Current reference count, or 0 for a released key.
    pub fn ref_count(&self, key: BufferKey) -> usize {
        self.lock().get(key).map_or(0, |slot| slot.refs)
    }

    /// Identity token of a live buffer.
    ///
    /// # Panics
    ///
    /// Panics if `key` was already released.
    pub fn buffer_id(&self, key: BufferKey) -> BufferId {
        self.lock().buffer(key).id()
    }

    /// Returns `true` if `source` is currently indexed.
    pub fn contains_source(&self, source: &SourceId) -> bool {
        self.lock().by_source.contains_key(source)
    }

    /// Number of live buffers.
    pub fn live_buffers(&self) -> usize {
        self.lock().stats.live
    }

    /// Number of indexed sources.
    pub fn indexed_sources(&self) -> usize {
        self.lock().by_source.len()
    }

    /// Memory held by all live sample arrays, in bytes.
    pub fn size_bytes(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .filter_map(|e| e.slot.as_ref())
            .map(|slot| slot.buffer.size_bytes())
            .sum()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }
}

impl std::fmt::Debug for BufferCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("BufferCache")
            .field("live", &state.stats.live)
            .field("indexed", &state.by_source.len())
            .finish()
    }
}
