//! In-memory retention of the latest result per document id.
//!
//! One entry per id; re-extraction overwrites. Unbounded unless a capacity is
//! configured, in which case the oldest inserted id is evicted first.
//! Concurrent writes to the same id are last-write-wins with no ordering guarantee.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use clinyx_common::EntityExtractionResult;

#[derive(Debug, Default)]
struct HistoryInner {
    entries: HashMap<String, EntityExtractionResult>,
    /// Insertion order of ids, for capacity eviction.
    order: VecDeque<String>,
}

/// Shared, cloneable handle to the history store.
#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    inner: Arc<RwLock<HistoryInner>>,
    capacity: Option<usize>,
}

impl HistoryCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner::default())),
            capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HistoryInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HistoryInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `result` under `id`, replacing any previous entry.
    pub fn insert(&self, id: &str, result: EntityExtractionResult) {
        let mut inner = self.write();

        if inner.entries.insert(id.to_string(), result).is_some() {
            debug!("History overwrite for document {}", id);
            return;
        }
        inner.order.push_back(id.to_string());

        if let Some(capacity) = self.capacity {
            while inner.entries.len() > capacity {
                let Some(oldest) = inner.order.pop_front() else { break };
                inner.entries.remove(&oldest);
                warn!("History capacity {} reached, evicted document {}", capacity, oldest);
            }
        }
    }

    /// Last stored result for `id`.
    pub fn get(&self, id: &str) -> Option<EntityExtractionResult> {
        self.read().entries.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.order.clear();
    }
}
