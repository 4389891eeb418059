//! Optional write-behind persistence of session snapshots.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::SessionKey;
use crate::game::SessionSnapshot;
use crate::registry::lock;

/// Storage for session snapshots. Written after each committed mutation and
/// never consulted when deciding a move.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &SessionSnapshot) -> anyhow::Result<()>;
    fn load(&self, key: &SessionKey) -> anyhow::Result<Option<SessionSnapshot>>;
    fn remove(&self, key: &SessionKey) -> anyhow::Result<()>;
}

/// Keeps bincode-encoded snapshots in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blobs: Mutex<HashMap<SessionKey, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.blobs).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, snapshot: &SessionSnapshot) -> anyhow::Result<()> {
        let data = bincode::serialize(snapshot)
            .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        lock(&self.blobs).insert(snapshot.key.clone(), data);
        Ok(())
    }

    fn load(&self, key: &SessionKey) -> anyhow::Result<Option<SessionSnapshot>> {
        match lock(&self.blobs).get(key) {
            Some(data) => {
                let snapshot = bincode::deserialize(data)
                    .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    fn remove(&self, key: &SessionKey) -> anyhow::Result<()> {
        lock(&self.blobs).remove(key);
        Ok(())
    }
}
