//! # Carcode Registry
//!
//! Vehicle registration on top of the `carcode` library:
//! - Record storage keyed by a unique registration number (SQLite or memory)
//! - Persistence of uploaded vehicle images under sanitized names
//! - Barcode and QR artifact generation with deterministic file names
//! - A registration pipeline that enforces uniqueness before writing anything
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use carcode::{CodeType, VehicleCandidate};
//! use carcode_registry::{Registry, RegistryConfig, storage::MemoryStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(MemoryStorage::new(), RegistryConfig::default());
//! registry.init().await?;
//!
//! let candidate = VehicleCandidate {
//!     make: "Toyota".into(),
//!     model: "Corolla".into(),
//!     year: "2020".into(),
//!     color: "Blue".into(),
//!     vin: "XYZ123".into(),
//!     reg_no: "ABC-001".into(),
//!     engine_no: "E1".into(),
//!     owner: "Jane".into(),
//!     fuel_type: "Petrol".into(),
//!     transmission: "Manual".into(),
//!     chassis_no: "C1".into(),
//! };
//!
//! let registration = registry.register(candidate, None, CodeType::Qr).await?;
//! println!("QR code written to {}", registration.artifact.path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod registry;
pub mod storage;

pub use config::{GenerationFailurePolicy, RegistryConfig};
pub use error::{GenerationError, RegistryError, Result};
pub use generator::{CodeArtifact, CodeGenerator};
pub use registry::{Registration, Registry, UploadedImage};
pub use storage::{FileStorage, MemoryStorage, RecordStore, StoreError};

#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
