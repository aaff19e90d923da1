//! Code artifact rendering
//!
//! Converts a vehicle record into PNG bytes for the requested code type.
//! Rendering is pure; writing the artifact is left to the caller.

use std::io::Cursor;

use barcoders::generators::image::Image;
use barcoders::sym::code128::Code128;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use serde::Serialize;

use crate::code::CodeType;
use crate::error::CodeError;
use crate::record::VehicleRecord;

/// Longest payload accepted for a barcode
pub const BARCODE_MAX_LEN: usize = 48;

/// Barcode bar height in pixels
pub const BARCODE_HEIGHT: u32 = 80;

/// Minimum QR image edge in pixels
pub const QR_MIN_DIMENSION: u32 = 256;

/// Selects Code 128 character set B, which covers printable ASCII
const CODE128_SET_B: char = 'Ɓ';

/// A rendered code image together with the data it encodes
#[derive(Debug, Clone, Serialize)]
pub struct RenderedCode {
    pub code_type: CodeType,
    pub payload: String,
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// Render the artifact image for `record`
///
/// # Errors
///
/// - `CodeError::UnsupportedPayload` if a barcode payload has characters
///   outside printable ASCII or is longer than [`BARCODE_MAX_LEN`]
/// - `CodeError::Symbology` / `CodeError::QrEncoding` if the encoder rejects
///   the payload
/// - `CodeError::Image` if the PNG cannot be produced
///
/// # Example
///
/// ```rust,no_run
/// use carcode::{CodeType, VehicleRecord, render_code};
///
/// # fn example(record: &VehicleRecord) -> Result<(), carcode::CodeError> {
/// let rendered = render_code(record, CodeType::Barcode)?;
/// assert_eq!(rendered.payload, record.reg_no);
/// std::fs::write("code.png", &rendered.png).ok();
/// # Ok(())
/// # }
/// ```
pub fn render_code(record: &VehicleRecord, code_type: CodeType) -> Result<RenderedCode, CodeError> {
    let payload = code_type.payload(record);

    let png = match code_type {
        CodeType::Barcode => render_barcode(&payload)?,
        CodeType::Qr => render_qr(&payload)?,
    };

    Ok(RenderedCode {
        code_type,
        payload,
        png,
    })
}

/// Encode `payload` as a Code 128 PNG
pub fn render_barcode(payload: &str) -> Result<Vec<u8>, CodeError> {
    if payload.is_empty() {
        return Err(CodeError::UnsupportedPayload("payload is empty".to_string()));
    }
    if let Some(c) = payload.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(CodeError::UnsupportedPayload(format!(
            "character {c:?} is outside printable ASCII"
        )));
    }
    let len = payload.chars().count();
    if len > BARCODE_MAX_LEN {
        return Err(CodeError::UnsupportedPayload(format!(
            "{len} characters exceeds the limit of {BARCODE_MAX_LEN}"
        )));
    }

    let barcode = Code128::new(format!("{CODE128_SET_B}{payload}"))
        .map_err(|e| CodeError::Symbology(e.to_string()))?;
    let encoded = barcode.encode();

    Image::png(BARCODE_HEIGHT)
        .generate(&encoded[..])
        .map_err(|e| CodeError::Symbology(e.to_string()))
}

/// Encode `payload` as a QR code PNG
pub fn render_qr(payload: &str) -> Result<Vec<u8>, CodeError> {
    let code =
        QrCode::new(payload.as_bytes()).map_err(|e| CodeError::QrEncoding(e.to_string()))?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CodeError::Image(e.to_string()))?;

    Ok(png)
}
