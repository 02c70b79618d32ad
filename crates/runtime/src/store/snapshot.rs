use std::sync::{Arc, RwLock};

use decision_core::GameSnapshot;

use crate::api::{BridgeError, Result};

/// Latest snapshot pushed by the engine, replaced wholesale on each update.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    latest: RwLock<Option<Arc<GameSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot and returns the previous one.
    pub fn replace(&self, snapshot: GameSnapshot) -> Result<Option<Arc<GameSnapshot>>> {
        let mut latest = self
            .latest
            .write()
            .map_err(|_| BridgeError::LockPoisoned { what: "snapshot" })?;
        Ok(latest.replace(Arc::new(snapshot)))
    }

    /// Latest snapshot, if the engine has pushed one.
    pub fn latest(&self) -> Result<Option<Arc<GameSnapshot>>> {
        let latest = self
            .latest
            .read()
            .map_err(|_| BridgeError::LockPoisoned { what: "snapshot" })?;
        Ok(latest.clone())
    }

    /// Latest snapshot, or an empty one before the first update.
    pub fn current(&self) -> Result<Arc<GameSnapshot>> {
        Ok(self.latest()?.unwrap_or_default())
    }
}
