//! Error types for the carcode library
//!
//! Errors are split by domain: record validation problems are user-correctable,
//! code errors come from payload selection or the symbology encoders.

use thiserror::Error;

/// Vehicle record validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid year '{value}': expected a number between {min} and {max}")]
    InvalidYear { value: String, min: u16, max: u16 },

    #[error("Invalid registration number '{reg_no}': {reason}")]
    InvalidRegNo { reg_no: String, reason: &'static str },
}

/// Code type and symbology errors
///
/// The messages carry the encoder's own description so callers can surface
/// them unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Unknown code type '{0}': expected 'barcode' or 'qr'")]
    UnknownCodeType(String),

    #[error("Payload not supported by Code 128: {0}")]
    UnsupportedPayload(String),

    #[error("Barcode encoding failed: {0}")]
    Symbology(String),

    #[error("QR encoding failed: {0}")]
    QrEncoding(String),

    #[error("Image encoding failed: {0}")]
    Image(String),
}
