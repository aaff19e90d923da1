//! Vehicle record model
//!
//! A [`VehicleCandidate`] is what a caller submits; a [`VehicleRecord`] is
//! the persisted document, the candidate plus an optional image reference.

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Earliest accepted model year
pub const MIN_YEAR: u16 = 1886;

/// Latest accepted model year
pub const MAX_YEAR: u16 = 2100;

/// Fields submitted for a new registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCandidate {
    pub make: String,
    pub model: String,
    pub year: String,
    pub color: String,
    pub vin: String,
    pub reg_no: String,
    pub engine_no: String,
    pub owner: String,
    pub fuel_type: String,
    pub transmission: String,
    pub chassis_no: String,
}

impl VehicleCandidate {
    /// Field names paired with their values, in document order
    pub fn fields(&self) -> [(&'static str, &str); 11] {
        [
            ("make", &self.make),
            ("model", &self.model),
            ("year", &self.year),
            ("color", &self.color),
            ("vin", &self.vin),
            ("reg_no", &self.reg_no),
            ("engine_no", &self.engine_no),
            ("owner", &self.owner),
            ("fuel_type", &self.fuel_type),
            ("transmission", &self.transmission),
            ("chassis_no", &self.chassis_no),
        ]
    }

    /// Check that the candidate can be registered
    ///
    /// Values are not normalized; a valid candidate is stored exactly as
    /// submitted.
    pub fn validate(&self) -> Result<(), RecordError> {
        for (name, value) in self.fields() {
            if value.trim().is_empty() {
                return Err(RecordError::MissingField(name));
            }
        }

        validate_year(&self.year)?;
        validate_reg_no(&self.reg_no)
    }
}

fn validate_year(year: &str) -> Result<(), RecordError> {
    let invalid = || RecordError::InvalidYear {
        value: year.to_string(),
        min: MIN_YEAR,
        max: MAX_YEAR,
    };

    let parsed: u16 = year.trim().parse().map_err(|_| invalid())?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&parsed) {
        return Err(invalid());
    }
    Ok(())
}

/// The registration number names artifact files, so it must be usable as a
/// single path component.
fn validate_reg_no(reg_no: &str) -> Result<(), RecordError> {
    let invalid = |reason| RecordError::InvalidRegNo {
        reg_no: reg_no.to_string(),
        reason,
    };

    if reg_no == "." || reg_no == ".." {
        return Err(invalid("reserved path name"));
    }
    if reg_no.contains(['/', '\\']) {
        return Err(invalid("path separators are not allowed"));
    }
    if reg_no.chars().any(char::is_control) {
        return Err(invalid("control characters are not allowed"));
    }
    Ok(())
}

/// A stored vehicle registration
///
/// Serializes to the document shape kept by the record store, keyed by
/// `reg_no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    pub year: String,
    pub color: String,
    pub vin: String,
    pub reg_no: String,
    pub engine_no: String,
    pub owner: String,
    pub fuel_type: String,
    pub transmission: String,
    pub chassis_no: String,
    /// Path of the uploaded vehicle image, if one was provided
    pub car_image: Option<String>,
}

impl VehicleRecord {
    /// Complete a candidate with its image reference
    pub fn from_candidate(candidate: VehicleCandidate, car_image: Option<String>) -> Self {
        let VehicleCandidate {
            make,
            model,
            year,
            color,
            vin,
            reg_no,
            engine_no,
            owner,
            fuel_type,
            transmission,
            chassis_no,
        } = candidate;

        Self {
            make,
            model,
            year,
            color,
            vin,
            reg_no,
            engine_no,
            owner,
            fuel_type,
            transmission,
            chassis_no,
            car_image,
        }
    }

    /// The submitted fields of this record, without the image reference
    pub fn candidate(&self) -> VehicleCandidate {
        VehicleCandidate {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year.clone(),
            color: self.color.clone(),
            vin: self.vin.clone(),
            reg_no: self.reg_no.clone(),
            engine_no: self.engine_no.clone(),
            owner: self.owner.clone(),
            fuel_type: self.fuel_type.clone(),
            transmission: self.transmission.clone(),
            chassis_no: self.chassis_no.clone(),
        }
    }
}
