//! Per-user async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock entries kept before idle ones are pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per user identity, created on first use.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_identity`'s critical section.
    pub async fn acquire(&self, user_identity: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_identity.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits on, once the map has grown.
    pub fn prune(&self) {
        if self.locks.len() < PRUNE_THRESHOLD {
            return;
        }
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of users with a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let locks = Arc::new(UserLocks::new());
        let guard = locks.acquire("ana").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("ana").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.expect("contender finished");
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let locks = UserLocks::new();
        let _ana = locks.acquire("ana").await;
        let _ben = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ben"))
            .await
            .expect("ben is independent");
        assert_eq!(locks.len(), 2);
    }
}
