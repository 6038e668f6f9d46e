use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Narrow-scope serialization: one async mutex per key, so operations on
/// unrelated accounts or requests never contend with each other.
///
/// The registry lock is held only long enough to fetch or insert the
/// per-key mutex; the returned guard is held for the duration of the
/// operation.
///
/// Entries are never evicted, so the map grows with the set of keys
/// seen over the process lifetime.
#[derive(Default)]
pub struct LockMap<K> {
    entries: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> LockMap<K> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().await;
            entries.entry(key).or_default().clone()
        };
        entry.lock_owned().await
    }
}
