//! Carcode turns vehicle registration records into scannable artifacts:
//! a Code 128 barcode carrying the registration number, or a QR code
//! carrying the whole record.

pub mod code;
pub mod error;
pub mod record;
pub mod render;

// Re-export core types
pub use code::CodeType;
pub use error::{CodeError, RecordError};
pub use record::{VehicleCandidate, VehicleRecord};
pub use render::{RenderedCode, render_barcode, render_code, render_qr};
