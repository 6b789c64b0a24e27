use crate::core::Sample;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded, oldest-first store of samples with FIFO eviction.
///
/// Storage is a `Vec` plus a head offset. Eviction only moves the head, so
/// dropping any number of old samples is a single step; the dead prefix is
/// compacted away once it reaches half the capacity, which keeps `append`
/// amortised O(1) and the live region contiguous.
pub struct SampleBuffer {
    samples: Vec<Sample>,
    head: usize,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
        self.enforce_capacity();
    }

    pub fn append_batch<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        self.samples.extend(samples);
        self.enforce_capacity();
    }

    /// Drops up to `count` of the oldest samples, returning how many went
    pub fn evict_oldest(&mut self, count: usize) -> usize {
        let evicted = count.min(self.len());
        self.head += evicted;
        self.compact();
        evicted
    }

    /// Read-only view of the live samples, oldest first
    pub fn snapshot(&self) -> &[Sample] {
        &self.samples[self.head..]
    }

    pub fn first(&self) -> Option<&Sample> {
        self.snapshot().first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.snapshot().last()
    }

    fn enforce_capacity(&mut self) {
        let len = self.len();
        if len > self.capacity {
            self.head += len - self.capacity;
            self.compact();
        }
    }

    fn compact(&mut self) {
        if self.head == self.samples.len() {
            self.samples.clear();
            self.head = 0;
        } else if self.head * 2 >= self.capacity {
            self.samples.drain(..self.head);
            self.head = 0;
        }
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Shared handle to the one authoritative sample buffer.
///
/// Every write goes through `append`, `append_batch` or `evict_oldest`, so the
/// capacity invariant always holds. Readers get a read guard and can only see
/// the snapshot. The generator is the only regular writer; a write made before
/// a render tick starts is visible to that tick.
#[derive(Clone)]
pub struct SharedBuffer {
    inner: Arc<RwLock<SampleBuffer>>,
}

impl SharedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SampleBuffer::new(capacity))),
        }
    }

    pub fn append(&self, sample: Sample) {
        self.write().append(sample);
    }

    pub fn append_batch<I>(&self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        self.write().append_batch(samples);
    }

    pub fn evict_oldest(&self, count: usize) -> usize {
        self.write().evict_oldest(count)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SampleBuffer> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_snapshot<R>(&self, f: impl FnOnce(&[Sample]) -> R) -> R {
        f(self.read().snapshot())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.read().capacity()
    }

    pub fn last(&self) -> Option<Sample> {
        self.read().last().cloned()
    }

    fn write(&self) -> RwLockWriteGuard<'_, SampleBuffer> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
