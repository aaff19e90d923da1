//! Storage abstraction for registry data
//!
//! Vehicle records live in a [`RecordStore`]; uploaded images and generated
//! artifacts are plain files managed by [`FileStorage`].

use async_trait::async_trait;
use carcode::VehicleRecord;

pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use file_storage::{
    FileStorage, FileStorageError, StagedFile, sanitize_filename, upload_file_name,
};
pub use memory_storage::MemoryStorage;

#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Registration number already exists: {0}")]
    Conflict(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record {reg_no}: {reason}")]
    Corrupt { reg_no: String, reason: String },
}

/// Document store for vehicle records, keyed by registration number
///
/// Implementations must enforce uniqueness of `reg_no` on insert rather than
/// relying on a preceding lookup.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exact-match lookup on the registration number
    async fn find_by_reg_no(&self, reg_no: &str) -> Result<Option<VehicleRecord>, StoreError>;

    /// Insert a new record; fails with `StoreError::Conflict` if the
    /// registration number is taken
    async fn insert(&self, record: &VehicleRecord) -> Result<(), StoreError>;

    /// Remove a record, returning whether it existed
    async fn delete(&self, reg_no: &str) -> Result<bool, StoreError>;

    /// Number of stored records
    async fn count(&self) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn find_by_reg_no(&self, reg_no: &str) -> Result<Option<VehicleRecord>, StoreError> {
        (**self).find_by_reg_no(reg_no).await
    }

    async fn insert(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }

    async fn delete(&self, reg_no: &str) -> Result<bool, StoreError> {
        (**self).delete(reg_no).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }
}
