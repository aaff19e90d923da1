//! Registration pipeline
//!
//! [`Registry`] ties the record store, image persistence and code generator
//! together: check the registration number is free, save the uploaded image,
//! insert the record, then generate its barcode or QR code.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use carcode::{CodeType, VehicleCandidate, VehicleRecord};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{GenerationFailurePolicy, RegistryConfig};
use crate::error::{RegistryError, Result};
use crate::generator::{CodeArtifact, CodeGenerator};
use crate::storage::{FileStorage, RecordStore, upload_file_name};

/// An uploaded vehicle image
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Name supplied by the client; sanitized before use
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// A form submitted without choosing a file yields an empty upload
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() || self.bytes.is_empty()
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub record: VehicleRecord,
    pub artifact: CodeArtifact,
}

/// Async mutexes keyed by registration number
///
/// Entries are dropped once no registration holds or awaits them.
#[derive(Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Exclusive hold on one key of [`KeyedLocks`]
///
/// Dropping the guard, including when the owning future is cancelled while
/// waiting, releases the key and removes its entry if nobody else needs it.
struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    held: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let handle = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(key.to_string()).or_default().clone()
        };

        let mut guard = KeyGuard {
            locks: self,
            key: key.to_string(),
            held: None,
        };
        guard.held = Some(handle.lock_owned().await);
        guard
    }

    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        let mut locks = self.locks.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

/// Vehicle registry over a record store
pub struct Registry<S: RecordStore> {
    store: S,
    images: FileStorage,
    generator: CodeGenerator,
    config: RegistryConfig,
    locks: KeyedLocks,
}

impl<S: RecordStore> Registry<S> {
    pub fn new(store: S, config: RegistryConfig) -> Self {
        let images = FileStorage::new(&config.upload_dir);
        let generator = CodeGenerator::new(
            FileStorage::new(&config.code_dir),
            config.operation_timeout,
        );

        Self {
            store,
            images,
            generator,
            config,
            locks: KeyedLocks::default(),
        }
    }

    /// Create the upload and code directories
    pub async fn init(&self) -> Result<()> {
        self.bounded("upload directory creation", self.images.ensure_root())
            .await?;
        self.bounded(
            "code directory creation",
            self.generator.storage().ensure_root(),
        )
        .await?;

        info!(
            "Storing uploads in {} and codes in {}",
            self.images.root().display(),
            self.generator.storage().root().display()
        );
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a vehicle and generate its code artifact
    ///
    /// Registrations sharing a registration number are serialized; the store's
    /// uniqueness constraint covers writers outside this process.
    ///
    /// # Errors
    ///
    /// - `InvalidCandidate` if a field is missing or malformed
    /// - `DuplicateIdentifier` if the registration number is taken; nothing is
    ///   written in that case
    /// - `CodeGenerationFailed` if the artifact cannot be produced; the record
    ///   stays stored unless the config asks for compensation
    /// - `StoreUnavailable`, `IoFailure` or `Timeout` for infrastructure faults
    pub async fn register(
        &self,
        candidate: VehicleCandidate,
        image: Option<UploadedImage>,
        code_type: CodeType,
    ) -> Result<Registration> {
        candidate.validate()?;

        let _guard = self.locks.lock(&candidate.reg_no).await;
        self.register_exclusive(candidate, image, code_type).await
    }

    async fn register_exclusive(
        &self,
        candidate: VehicleCandidate,
        image: Option<UploadedImage>,
        code_type: CodeType,
    ) -> Result<Registration> {
        let existing = self
            .bounded("record lookup", self.store.find_by_reg_no(&candidate.reg_no))
            .await?;
        if existing.is_some() {
            warn!("Registration number already exists: {}", candidate.reg_no);
            return Err(RegistryError::DuplicateIdentifier(candidate.reg_no));
        }

        // The image only appears under its final name once the record is in
        let staged = match image.filter(|image| !image.is_empty()) {
            Some(image) => {
                let file_name = upload_file_name(&candidate.reg_no, &image.file_name);
                Some(
                    self.bounded("image save", self.images.stage(&file_name, &image.bytes))
                        .await?,
                )
            }
            None => None,
        };

        let record = VehicleRecord::from_candidate(
            candidate,
            staged
                .as_ref()
                .map(|staged| staged.target().to_string_lossy().into_owned()),
        );

        if let Err(e) = self.bounded("record insert", self.store.insert(&record)).await {
            match &e {
                RegistryError::DuplicateIdentifier(_) => {
                    warn!("Store rejected duplicate registration: {}", record.reg_no)
                }
                _ => error!("Failed to insert record {}: {}", record.reg_no, e),
            }
            if let Some(staged) = staged {
                if let Err(e) = self.bounded("image discard", self.images.discard(staged)).await {
                    error!("Failed to discard image for {}: {}", record.reg_no, e);
                }
            }
            return Err(e);
        }

        let image_path = match staged {
            Some(staged) => match self.bounded("image save", self.images.commit(staged)).await {
                Ok(path) => {
                    debug!("Saved vehicle image to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    error!("Failed to save image for {}: {}", record.reg_no, e);
                    self.delete_record(&record.reg_no).await;
                    return Err(e);
                }
            },
            None => None,
        };

        match self.generator.generate(&record, code_type).await {
            Ok(artifact) => {
                info!(
                    "Registered {} with {} at {}",
                    record.reg_no,
                    code_type,
                    artifact.path.display()
                );
                Ok(Registration { record, artifact })
            }
            Err(source) => {
                error!("Code generation failed for {}: {}", record.reg_no, source);
                if self.config.on_generation_failure == GenerationFailurePolicy::Compensate {
                    self.compensate(&record.reg_no, code_type, image_path.as_deref())
                        .await;
                }
                Err(RegistryError::CodeGenerationFailed {
                    reg_no: record.reg_no,
                    source,
                })
            }
        }
    }

    /// Undo a registration whose artifact could not be generated
    ///
    /// A write that timed out may have left part of the artifact behind, so
    /// the artifact file is removed along with the record and image.
    async fn compensate(&self, reg_no: &str, code_type: CodeType, image_path: Option<&Path>) {
        warn!("Removing record {} after failed code generation", reg_no);
        self.delete_record(reg_no).await;

        if let Some(path) = image_path {
            self.remove_file(&self.images, path).await;
        }

        let codes = self.generator.storage();
        if let Ok(path) = codes.path_for(&code_type.file_name(reg_no)) {
            self.remove_file(codes, &path).await;
        }
    }

    async fn delete_record(&self, reg_no: &str) {
        if let Err(e) = self.bounded("record delete", self.store.delete(reg_no)).await {
            error!("Failed to remove record {}: {}", reg_no, e);
        }
    }

    async fn remove_file(&self, storage: &FileStorage, path: &Path) {
        if let Err(e) = self.bounded("file removal", storage.remove(path)).await {
            error!("Failed to remove {}: {}", path.display(), e);
        }
    }

    /// Look up a stored vehicle by registration number
    pub async fn find(&self, reg_no: &str) -> Result<Option<VehicleRecord>> {
        self.bounded("record lookup", self.store.find_by_reg_no(reg_no))
            .await
    }

    /// Generate the artifact for an already stored vehicle again
    pub async fn regenerate(&self, reg_no: &str, code_type: CodeType) -> Result<CodeArtifact> {
        let record = self
            .find(reg_no)
            .await?
            .ok_or_else(|| RegistryError::RecordNotFound(reg_no.to_string()))?;

        let artifact = self
            .generator
            .generate(&record, code_type)
            .await
            .map_err(|source| RegistryError::CodeGenerationFailed {
                reg_no: reg_no.to_string(),
                source,
            })?;

        info!("Regenerated {} artifact for {}", code_type, reg_no);
        Ok(artifact)
    }

    /// Bytes of a generated artifact, by file name
    pub async fn artifact(&self, file_name: &str) -> Result<Vec<u8>> {
        self.bounded("artifact read", self.generator.storage().read(file_name))
            .await
    }

    /// Number of stored vehicles
    pub async fn count(&self) -> Result<u64> {
        self.bounded("record count", self.store.count()).await
    }

    /// Run a store or filesystem call under the configured timeout
    async fn bounded<T, E, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        RegistryError: From<E>,
    {
        let after = self.config.operation_timeout;
        match tokio::time::timeout(after, call).await {
            Ok(result) => result.map_err(RegistryError::from),
            Err(_) => {
                error!("{} timed out after {:?}", operation, after);
                Err(RegistryError::Timeout { operation, after })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StoreError};
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Store whose lookups take longer than any caller waits
    struct SlowStore(MemoryStorage);

    #[async_trait]
    impl RecordStore for SlowStore {
        async fn find_by_reg_no(
            &self,
            reg_no: &str,
        ) -> std::result::Result<Option<VehicleRecord>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.0.find_by_reg_no(reg_no).await
        }

        async fn insert(&self, record: &VehicleRecord) -> std::result::Result<(), StoreError> {
            self.0.insert(record).await
        }

        async fn delete(&self, reg_no: &str) -> std::result::Result<bool, StoreError> {
            self.0.delete(reg_no).await
        }

        async fn count(&self) -> std::result::Result<u64, StoreError> {
            self.0.count().await
        }
    }

    fn candidate(reg_no: &str) -> VehicleCandidate {
        VehicleCandidate {
            make: "Ford".into(),
            model: "Focus".into(),
            year: "2015".into(),
            color: "White".into(),
            vin: "1FA".into(),
            reg_no: reg_no.into(),
            engine_no: "EF-1".into(),
            owner: "Alex".into(),
            fuel_type: "Petrol".into(),
            transmission: "Manual".into(),
            chassis_no: "CF-1".into(),
        }
    }

    #[tokio::test]
    async fn test_keyed_locks_are_released() {
        let locks = KeyedLocks::default();

        let first = locks.lock("AB-1").await;
        let other = locks.lock("AB-2").await;
        assert_eq!(locks.len(), 2);

        drop(first);
        assert_eq!(locks.len(), 1);
        drop(other);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_wait_releases_key() {
        let locks = KeyedLocks::default();

        let held = locks.lock("AB-1").await;
        let waited =
            tokio::time::timeout(Duration::from_millis(10), locks.lock("AB-1")).await;
        assert!(waited.is_err());
        assert_eq!(locks.len(), 1);

        drop(held);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_empty_upload() {
        assert!(UploadedImage::new("", b"bytes".to_vec()).is_empty());
        assert!(UploadedImage::new("car.jpg", Vec::new()).is_empty());
        assert!(!UploadedImage::new("car.jpg", b"bytes".to_vec()).is_empty());
    }

    #[tokio::test]
    async fn test_lock_table_is_empty_after_registration() {
        let temp_dir = tempdir().unwrap();
        let registry = Registry::new(
            MemoryStorage::new(),
            RegistryConfig::with_base_dir(temp_dir.path()),
        );

        registry
            .register(candidate("FF-1"), None, CodeType::Barcode)
            .await
            .unwrap();
        let _ = registry
            .register(candidate("FF-1"), None, CodeType::Barcode)
            .await;

        assert_eq!(registry.locks.len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_candidate_touches_nothing() {
        let temp_dir = tempdir().unwrap();
        let registry = Registry::new(
            MemoryStorage::new(),
            RegistryConfig::with_base_dir(temp_dir.path()),
        );

        let mut invalid = candidate("FF-2");
        invalid.vin = String::new();
        let result = registry
            .register(
                invalid,
                Some(UploadedImage::new("car.jpg", b"jpeg".to_vec())),
                CodeType::Qr,
            )
            .await;

        assert!(matches!(result, Err(RegistryError::InvalidCandidate(_))));
        assert!(registry.store().is_empty());
        assert!(!temp_dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_cancelled_registrations_leave_no_locks() {
        let temp_dir = tempdir().unwrap();
        let registry = Registry::new(
            SlowStore(MemoryStorage::new()),
            RegistryConfig::with_base_dir(temp_dir.path()),
        );

        for i in 0..5 {
            let result = tokio::time::timeout(
                Duration::from_millis(10),
                registry.register(candidate(&format!("SL-{}", i)), None, CodeType::Qr),
            )
            .await;
            assert!(result.is_err());
        }

        assert_eq!(registry.locks.len(), 0);
    }
}
