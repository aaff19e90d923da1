//! Vehicle registration API models

use std::collections::HashMap;

use carcode::{CodeType, VehicleCandidate, VehicleRecord};
use carcode_registry::{CodeArtifact, Registration, UploadedImage};
use serde::Serialize;

use crate::error::{ApiError, Result};

/// Multipart field carrying the requested code type
pub const CODE_TYPE_FIELD: &str = "code_type";

/// Multipart field carrying the optional vehicle image
pub const IMAGE_FIELD: &str = "car_image";

/// Fields collected from a registration form submission
#[derive(Debug, Default)]
pub struct RegistrationForm {
    fields: HashMap<String, String>,
    image: Option<UploadedImage>,
}

/// A registration form resolved into typed values
#[derive(Debug)]
pub struct RegistrationRequest {
    pub candidate: VehicleCandidate,
    pub image: Option<UploadedImage>,
    pub code_type: CodeType,
}

impl RegistrationForm {
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_image(&mut self, image: UploadedImage) {
        self.image = Some(image);
    }

    fn field(&self, name: &str) -> Result<String> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::validation(&format!("Missing form field: {}", name)))
    }

    /// Resolve the form into a candidate, code type and image
    ///
    /// Absent fields are rejected here; empty ones are left to record
    /// validation.
    pub fn into_request(self) -> Result<RegistrationRequest> {
        let code_type = self
            .field(CODE_TYPE_FIELD)?
            .parse::<CodeType>()
            .map_err(|e| ApiError::validation(&e.to_string()))?;

        let candidate = VehicleCandidate {
            make: self.field("make")?,
            model: self.field("model")?,
            year: self.field("year")?,
            color: self.field("color")?,
            vin: self.field("vin")?,
            reg_no: self.field("reg_no")?,
            engine_no: self.field("engine_no")?,
            owner: self.field("owner")?,
            fuel_type: self.field("fuel_type")?,
            transmission: self.field("transmission")?,
            chassis_no: self.field("chassis_no")?,
        };

        Ok(RegistrationRequest {
            candidate,
            image: self.image,
            code_type,
        })
    }
}

/// Download route for an artifact
pub fn download_url(artifact: &CodeArtifact) -> String {
    format!(
        "/download/{}",
        urlencoding::encode(artifact.file_name().unwrap_or_default())
    )
}

/// Response for a completed registration
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub record: VehicleRecord,
    pub artifact: CodeArtifact,
    pub download_url: String,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self {
            download_url: download_url(&registration.artifact),
            record: registration.record,
            artifact: registration.artifact,
        }
    }
}

/// Response for a regenerated artifact
#[derive(Debug, Serialize)]
pub struct ArtifactResponse {
    pub artifact: CodeArtifact,
    pub download_url: String,
}

impl From<CodeArtifact> for ArtifactResponse {
    fn from(artifact: CodeArtifact) -> Self {
        Self {
            download_url: download_url(&artifact),
            artifact,
        }
    }
}
