use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Keyed async mutex serializing decision processing per tender within one engine.
///
/// Holding the guard across "record, cancel, maybe close" keeps a second decision
/// from being accepted between another one reaching quorum and the tender closing.
/// Engines sharing a database are serialized by the decision store instead.
#[derive(Clone, Default)]
pub struct TenderLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl TenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the tender. Released when the guard drops.
    pub async fn acquire(&self, tender_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Only the map holds idle entries
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(tender_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of tenders with a holder or waiter.
    pub async fn active(&self) -> usize {
        let locks = self.locks.lock().await;
        locks
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_tender_is_exclusive() {
        let locks = TenderLocks::new();
        let tender_id = Uuid::new_v4();

        let guard = locks.acquire(tender_id).await;
        let contender = locks.clone();
        let waiting = tokio::spawn(async move { contender.acquire(tender_id).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        let second = tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
        drop(second);
    }

    #[tokio::test]
    async fn test_different_tenders_do_not_block() {
        let locks = TenderLocks::new();
        let _first = locks.acquire(Uuid::new_v4()).await;
        let second = tokio::time::timeout(Duration::from_secs(1), locks.acquire(Uuid::new_v4())).await;
        assert!(second.is_ok());
        assert_eq!(locks.active().await, 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = TenderLocks::new();
        drop(locks.acquire(Uuid::new_v4()).await);
        drop(locks.acquire(Uuid::new_v4()).await);
        assert_eq!(locks.active().await, 0);
        let _held = locks.acquire(Uuid::new_v4()).await;
        assert_eq!(locks.locks.lock().await.len(), 1);
    }
}
