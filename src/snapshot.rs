//! Shared store for the most recently published snapshot.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::Snapshot;

/// Single-slot store shared between the refresh pipeline (writer) and the
/// serving layer (readers).
///
/// Publishing swaps one `Arc` under the write lock, so readers observe
/// either the previous snapshot or the new one in full, never a partial
/// write. Reads between publishes return clones of the same `Arc`.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current snapshot.
    pub async fn publish(&self, snapshot: Snapshot) {
        *self.inner.write().await = Some(Arc::new(snapshot));
    }

    /// The last published snapshot, or `None` before the first successful
    /// cycle.
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(last_updated: i64) -> Snapshot {
        Snapshot {
            last_updated,
            vehicles: vec![],
        }
    }

    #[tokio::test]
    async fn test_empty_until_first_publish() {
        let store = SnapshotStore::new();
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_replaces_current() {
        let store = SnapshotStore::new();
        store.publish(snapshot(100)).await;
        assert_eq!(store.current().await.unwrap().last_updated, 100);

        store.publish(snapshot(200)).await;
        assert_eq!(store.current().await.unwrap().last_updated, 200);
    }

    #[tokio::test]
    async fn test_reads_between_publishes_are_identical() {
        let store = SnapshotStore::new();
        store.publish(snapshot(100)).await;

        let first = store.current().await.unwrap();
        let second = store.current().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_readers_keep_old_snapshot_alive_across_publish() {
        let store = SnapshotStore::new();
        store.publish(snapshot(100)).await;
        let held = store.current().await.unwrap();

        store.publish(snapshot(200)).await;

        // The replaced snapshot stays valid for whoever already holds it.
        assert_eq!(held.last_updated, 100);
        assert_eq!(store.current().await.unwrap().last_updated, 200);
    }
}
