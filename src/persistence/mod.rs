//! Persistence layer for verification snapshots

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteSnapshotStore;

use crate::core::PipelineSnapshot;
use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Insert or replace the latest snapshot of an application
    async fn save_snapshot(&self, snapshot: &PipelineSnapshot) -> Result<()>;

    /// Load the latest snapshot of an application
    async fn load_snapshot(&self, application_id: Uuid) -> Result<Option<PipelineSnapshot>>;

    /// Most recently created applications first
    async fn list_snapshots(&self, limit: usize) -> Result<Vec<PipelineSnapshot>>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    snapshots: RwLock<HashMap<Uuid, PipelineSnapshot>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_snapshot(&self, snapshot: &PipelineSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(snapshot.application_id, snapshot.clone());
        Ok(())
    }

    async fn load_snapshot(&self, application_id: Uuid) -> Result<Option<PipelineSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(&application_id).cloned())
    }

    async fn list_snapshots(&self, limit: usize) -> Result<Vec<PipelineSnapshot>> {
        let snapshots = self.snapshots.read().await;
        let mut result: Vec<PipelineSnapshot> = snapshots.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }
}
