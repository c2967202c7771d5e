//! Snapshot persistence: the `{plan, completionStatus}` document.
//!
//! Loading is forgiving. Anything that cannot be read back as a snapshot is
//! logged and treated as "nothing saved", so a corrupt file never keeps the
//! application from starting.

use tracing::{debug, warn};

use crate::models::Snapshot;
use crate::storage::{Storage, StoreError};

/// The single storage key the snapshot lives under. The version suffix lets a
/// future incompatible document use a new key instead of colliding with this one.
pub const SNAPSHOT_KEY: &str = "rpm_master_data_v2";

/// Reads and writes the application snapshot through a [`Storage`] backend.
#[derive(Debug)]
pub struct SnapshotStore<S> {
    storage: S,
}

impl<S: Storage> SnapshotStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the saved snapshot, if any.
    ///
    /// Read errors and malformed documents are treated as absent.
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.storage.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved snapshot");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "failed to read saved snapshot; starting fresh");
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "saved snapshot is not JSON; starting fresh");
                return None;
            }
        };

        // A `null` plan means the last session ended without one.
        if value.get("plan").is_some_and(serde_json::Value::is_null) {
            return None;
        }

        match serde_json::from_value::<Snapshot>(value) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "saved snapshot is malformed; starting fresh");
                None
            }
        }
    }

    /// Write `snapshot`, replacing whatever was stored.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)?;
        self.storage.set(SNAPSHOT_KEY, &json)
    }

    /// Whether anything is stored under the snapshot key, readable or not.
    pub fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.storage.get(SNAPSHOT_KEY)?.is_some())
    }

    /// Remove the stored snapshot.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove(SNAPSHOT_KEY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
