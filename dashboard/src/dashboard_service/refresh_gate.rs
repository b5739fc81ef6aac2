use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::info;

use super::models::DashboardSnapshot;

/// Keeps the latest snapshot of a dashboard session.
///
/// Every refresh takes a generation from `begin`; a snapshot is only applied if
/// no newer generation was issued since, so a slow refresh resolving late can
/// never overwrite a fresher one.
#[derive(Debug, Default)]
pub struct RefreshGate {
    latest_generation: AtomicU64,
    current: RwLock<Option<DashboardSnapshot>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next generation, invalidating every refresh still in flight
    pub fn begin(&self) -> u64 {
        self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation.load(Ordering::SeqCst)
    }

    /// Stores `snapshot` if its generation is still the latest one.
    ///
    /// Returns whether it was applied.
    pub async fn apply(&self, snapshot: DashboardSnapshot) -> bool {
        let mut current = self.current.write().await;

        // Checked under the lock so `clear` cannot interleave
        let latest = self.latest_generation();
        if snapshot.generation != latest {
            info!(
                "Discarding stale snapshot of {} (generation {}, latest {})",
                snapshot.user_address, snapshot.generation, latest
            );
            return false;
        }

        *current = Some(snapshot);
        true
    }

    pub async fn current(&self) -> Option<DashboardSnapshot> {
        self.current.read().await.clone()
    }

    /// Drops the current snapshot and every refresh in flight, as on wallet disconnect
    pub async fn clear(&self) {
        let mut current = self.current.write().await;
        self.begin();
        *current = None;
    }
}
