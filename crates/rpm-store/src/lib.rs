//! Data model and local persistence for the RPM matrix.

pub mod config;
pub mod models;
pub mod snapshot;
pub mod storage;

pub use config::StoreConfig;
pub use snapshot::{SNAPSHOT_KEY, SnapshotStore};
pub use storage::{FileStorage, MemoryStorage, Storage, StoreError};

/// Open the file-backed snapshot store for `config`.
pub fn open_store(config: &StoreConfig) -> SnapshotStore<FileStorage> {
    SnapshotStore::new(FileStorage::new(config.data_dir.clone()))
}
