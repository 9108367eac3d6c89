//! Per-station mutual exclusion
//!
//! Folds are order sensitive, so every lifecycle call against one charging
//! station is serialised. Different stations never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Registry of one async mutex per charging station
#[derive(Default)]
pub struct StationLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Shared, reference-counted lock registry
pub type SharedStationLocks = Arc<StationLocks>;

impl StationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedStationLocks {
        Arc::new(Self::new())
    }

    /// Wait for exclusive access to `charge_point_id`; released on drop.
    pub async fn acquire(&self, charge_point_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard is not held across the await
        let lock = self
            .locks
            .entry(charge_point_id.to_string())
            .or_default()
            .clone();
        trace!(charge_point_id, "Waiting for station lock");
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_station_is_exclusive() {
        let locks = StationLocks::shared();
        let guard = locks.acquire("CP001").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("CP001").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_stations_do_not_contend() {
        let locks = StationLocks::new();
        let _first = locks.acquire("CP001").await;
        let _second = tokio::time::timeout(Duration::from_secs(1), locks.acquire("CP002"))
            .await
            .expect("second station must not wait");
        assert_eq!(locks.len(), 2);
    }
}
