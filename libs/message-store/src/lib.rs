use std::collections::VecDeque;
use std::num::NonZeroUsize;

use tokio::sync::RwLock;

use whisper_api::Keyed;

/// Capacity used by both services unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store capacity must be at least 1")]
    ZeroCapacity,
}

// ═══════════════════════════════════════════════════════════════
//  BoundedStore
// ═══════════════════════════════════════════════════════════════

/// Fixed-capacity ring of the most recent records, oldest first.
///
/// `add` evicts from the front once the store is full. Writers take the
/// lock exclusively; `contains` and `snapshot` share it, so a reader never
/// sees a half-applied append. The underlying deque never leaves the lock.
pub struct BoundedStore<R> {
    records: RwLock<VecDeque<R>>,
    capacity: NonZeroUsize,
}

impl<R> std::fmt::Debug for BoundedStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedStore")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<R: Keyed + Clone> BoundedStore<R> {
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(StoreError::ZeroCapacity)?;
        Ok(Self {
            records: RwLock::new(VecDeque::with_capacity(capacity.get().min(65536) + 1)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Append `record`, dropping the oldest entries beyond capacity.
    pub async fn add(&self, record: R) {
        let mut buf = self.records.write().await;
        buf.push_back(record);
        while buf.len() > self.capacity.get() {
            buf.pop_front();
        }
    }

    /// Whether any held record is keyed by `key`.
    pub async fn contains(&self, key: &str) -> bool {
        let buf = self.records.read().await;
        buf.iter().any(|r| r.key() == key)
    }

    /// Independent copy of the current contents in insertion order.
    pub async fn snapshot(&self) -> Vec<R> {
        let buf = self.records.read().await;
        buf.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
