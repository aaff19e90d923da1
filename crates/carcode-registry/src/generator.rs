//! Code artifact generation
//!
//! Renders a record's barcode or QR code and writes it to the code
//! directory under a name derived from the registration number.

use std::path::PathBuf;
use std::time::Duration;

use carcode::{CodeType, VehicleRecord, render_code};
use serde::Serialize;
use tracing::debug;

use crate::error::GenerationError;
use crate::storage::FileStorage;

/// A generated code image on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeArtifact {
    pub code_type: CodeType,
    /// The data encoded in the image
    pub payload: String,
    pub path: PathBuf,
}

impl CodeArtifact {
    /// File name of the artifact inside the code directory
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

pub struct CodeGenerator {
    codes: FileStorage,
    write_timeout: Duration,
}

impl CodeGenerator {
    pub fn new(codes: FileStorage, write_timeout: Duration) -> Self {
        Self {
            codes,
            write_timeout,
        }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.codes
    }

    /// Render and write the artifact for `record`
    ///
    /// The path depends only on the registration number and code type, so
    /// regenerating overwrites the previous artifact.
    pub async fn generate(
        &self,
        record: &VehicleRecord,
        code_type: CodeType,
    ) -> Result<CodeArtifact, GenerationError> {
        let rendered = render_code(record, code_type)?;
        let file_name = code_type.file_name(&record.reg_no);

        debug!(
            "Writing {} artifact {} ({} bytes)",
            code_type,
            file_name,
            rendered.png.len()
        );

        let path = tokio::time::timeout(
            self.write_timeout,
            self.codes.write(&file_name, &rendered.png),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.write_timeout))??;

        Ok(CodeArtifact {
            code_type,
            payload: rendered.payload,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carcode::{CodeError, VehicleCandidate};
    use tempfile::tempdir;

    fn record(reg_no: &str) -> VehicleRecord {
        VehicleRecord::from_candidate(
            VehicleCandidate {
                make: "Mazda".into(),
                model: "3".into(),
                year: "2021".into(),
                color: "Red".into(),
                vin: "JM1".into(),
                reg_no: reg_no.into(),
                engine_no: "PE".into(),
                owner: "Sam".into(),
                fuel_type: "Petrol".into(),
                transmission: "Manual".into(),
                chassis_no: "BP".into(),
            },
            None,
        )
    }

    fn generator(dir: &std::path::Path) -> CodeGenerator {
        CodeGenerator::new(FileStorage::new(dir.join("codes")), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_generate_writes_one_file_per_code_type() {
        let temp_dir = tempdir().unwrap();
        let generator = generator(temp_dir.path());

        let barcode = generator.generate(&record("MZ-3"), CodeType::Barcode).await.unwrap();
        let qr = generator.generate(&record("MZ-3"), CodeType::Qr).await.unwrap();

        assert_eq!(barcode.path, temp_dir.path().join("codes").join("MZ-3.png"));
        assert_eq!(qr.path, temp_dir.path().join("codes").join("MZ-3_qr.png"));
        assert_eq!(barcode.payload, "MZ-3");
        assert_eq!(qr.file_name(), Some("MZ-3_qr.png"));

        let entries = std::fs::read_dir(temp_dir.path().join("codes")).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn test_regenerate_overwrites_same_path() {
        let temp_dir = tempdir().unwrap();
        let generator = generator(temp_dir.path());

        let first = generator.generate(&record("MZ-3"), CodeType::Qr).await.unwrap();

        let mut changed = record("MZ-3");
        changed.owner = "New Owner".into();
        let second = generator.generate(&changed, CodeType::Qr).await.unwrap();

        assert_eq!(first.path, second.path);
        assert_ne!(first.payload, second.payload);

        let entries = std::fs::read_dir(temp_dir.path().join("codes")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_encoder_rejection_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let generator = generator(temp_dir.path());

        let result = generator.generate(&record("MZ-ü"), CodeType::Barcode).await;

        assert!(matches!(
            result,
            Err(GenerationError::Encode(CodeError::UnsupportedPayload(_)))
        ));
        assert!(!generator.storage().exists("MZ-ü.png").await);
    }
}
