use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

struct Slot<T> {
    value: Arc<Mutex<T>>,
    touched: Instant,
}

/// Live quiz sessions and roadmap flows, keyed by id.
///
/// Each entry has its own mutex so one slow AI call only blocks its own session.
/// Entries untouched for longer than `ttl` are dropped on the next insert or lookup.
pub struct SessionRegistry<T> {
    inner: Arc<RwLock<HashMap<Uuid, Slot<T>>>>,
    ttl: Duration,
}

impl<T> Clone for SessionRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

impl<T> SessionRegistry<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn insert(&self, id: Uuid, value: T) -> Arc<Mutex<T>> {
        let entry = Arc::new(Mutex::new(value));
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        // An entry someone still holds is in use, however old its timestamp.
        map.retain(|_, slot| {
            Arc::strong_count(&slot.value) > 1 || now.duration_since(slot.touched) <= self.ttl
        });
        if map.len() < before {
            debug!("Evicted {} idle sessions", before - map.len());
        }
        map.insert(
            id,
            Slot {
                value: Arc::clone(&entry),
                touched: now,
            },
        );
        entry
    }

    /// Returns the entry and refreshes its idle timer. An expired entry is removed instead.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<T>>> {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let slot = map.get_mut(&id)?;
        if Arc::strong_count(&slot.value) == 1 && now.duration_since(slot.touched) > self.ttl {
            map.remove(&id);
            return None;
        }
        slot.touched = now;
        Some(Arc::clone(&slot.value))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
