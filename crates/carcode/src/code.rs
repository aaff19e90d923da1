//! Code types and payload selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodeError;
use crate::record::VehicleRecord;

/// The kind of machine-readable code generated for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    /// Code 128 barcode carrying only the registration number
    Barcode,
    /// QR code carrying the full record as text
    Qr,
}

impl CodeType {
    /// Data encoded into the artifact for `record`
    ///
    /// Code 128 has a narrow character set and practical length limit, so a
    /// barcode carries the identifier alone. A QR code has room for the whole
    /// record and can be read without a lookup.
    pub fn payload(self, record: &VehicleRecord) -> String {
        match self {
            CodeType::Barcode => record.reg_no.clone(),
            CodeType::Qr => qr_lines(record)
                .iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Artifact file name for a registration number
    pub fn file_name(self, reg_no: &str) -> String {
        match self {
            CodeType::Barcode => format!("{reg_no}.png"),
            CodeType::Qr => format!("{reg_no}_qr.png"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CodeType::Barcode => "barcode",
            CodeType::Qr => "qr",
        }
    }
}

/// Labelled record fields in QR payload order
fn qr_lines(record: &VehicleRecord) -> [(&'static str, &str); 11] {
    [
        ("Make", &record.make),
        ("Model", &record.model),
        ("Year", &record.year),
        ("Color", &record.color),
        ("VIN", &record.vin),
        ("Reg No", &record.reg_no),
        ("Engine No", &record.engine_no),
        ("Owner", &record.owner),
        ("Fuel Type", &record.fuel_type),
        ("Transmission", &record.transmission),
        ("Chassis No", &record.chassis_no),
    ]
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeType {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "barcode" => Ok(CodeType::Barcode),
            "qr" => Ok(CodeType::Qr),
            _ => Err(CodeError::UnknownCodeType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VehicleCandidate;

    fn record(reg_no: &str) -> VehicleRecord {
        VehicleRecord::from_candidate(
            VehicleCandidate {
                make: "Toyota".into(),
                model: "Corolla".into(),
                year: "2020".into(),
                color: "Blue".into(),
                vin: "XYZ123".into(),
                reg_no: reg_no.into(),
                engine_no: "E1".into(),
                owner: "Jane".into(),
                fuel_type: "Petrol".into(),
                transmission: "Manual".into(),
                chassis_no: "C1".into(),
            },
            Some("static/uploads/corolla.jpg".into()),
        )
    }

    #[test]
    fn test_parse_code_type() {
        assert_eq!("barcode".parse::<CodeType>(), Ok(CodeType::Barcode));
        assert_eq!(" QR ".parse::<CodeType>(), Ok(CodeType::Qr));
        assert_eq!(
            "ean13".parse::<CodeType>(),
            Err(CodeError::UnknownCodeType("ean13".into()))
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&CodeType::Qr).unwrap(), "\"qr\"");
        let parsed: CodeType = serde_json::from_str("\"barcode\"").unwrap();
        assert_eq!(parsed, CodeType::Barcode);
    }

    #[test]
    fn test_barcode_payload_is_reg_no_only() {
        let mut first = record("ABC-002");
        let mut second = record("ABC-002");
        first.owner = "Jane".into();
        second.owner = "Someone Else".into();
        second.color = "Red".into();

        assert_eq!(CodeType::Barcode.payload(&first), "ABC-002");
        assert_eq!(CodeType::Barcode.payload(&second), "ABC-002");
    }

    #[test]
    fn test_qr_payload_order() {
        let payload = CodeType::Qr.payload(&record("ABC-001"));
        let lines: Vec<&str> = payload.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Make: Toyota",
                "Model: Corolla",
                "Year: 2020",
                "Color: Blue",
                "VIN: XYZ123",
                "Reg No: ABC-001",
                "Engine No: E1",
                "Owner: Jane",
                "Fuel Type: Petrol",
                "Transmission: Manual",
                "Chassis No: C1",
            ]
        );
        assert!(!payload.ends_with('\n'));
        assert!(!payload.contains("corolla.jpg"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(CodeType::Barcode.file_name("ABC-002"), "ABC-002.png");
        assert_eq!(CodeType::Qr.file_name("ABC-001"), "ABC-001_qr.png");
    }
}
