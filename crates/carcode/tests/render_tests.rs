use carcode::render::{BARCODE_MAX_LEN, QR_MIN_DIMENSION};
use carcode::{CodeError, CodeType, VehicleCandidate, VehicleRecord, render_barcode, render_code, render_qr};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

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
        None,
    )
}

#[test]
fn test_render_barcode_png() {
    let rendered = render_code(&record("ABC-002"), CodeType::Barcode).unwrap();

    assert_eq!(rendered.code_type, CodeType::Barcode);
    assert_eq!(rendered.payload, "ABC-002");
    assert!(rendered.png.starts_with(PNG_SIGNATURE));

    let image = image::load_from_memory(&rendered.png).unwrap();
    assert!(image.width() > 0);
    assert!(image.height() > 0);
}

#[test]
fn test_longer_barcode_is_wider() {
    let short = image::load_from_memory(&render_barcode("AB1").unwrap()).unwrap();
    let long = image::load_from_memory(&render_barcode("AB1-2345-6789").unwrap()).unwrap();

    assert!(long.width() > short.width());
}

#[test]
fn test_render_qr_png() {
    let rendered = render_code(&record("ABC-001"), CodeType::Qr).unwrap();

    assert_eq!(rendered.payload.lines().next(), Some("Make: Toyota"));
    assert_eq!(rendered.payload.lines().count(), 11);
    assert!(rendered.png.starts_with(PNG_SIGNATURE));

    let image = image::load_from_memory(&rendered.png).unwrap();
    assert!(image.width() >= QR_MIN_DIMENSION);
    assert_eq!(image.width(), image.height());
}

#[test]
fn test_barcode_rejects_non_ascii() {
    let result = render_code(&record("ÄBC-001"), CodeType::Barcode);

    match result {
        Err(CodeError::UnsupportedPayload(message)) => assert!(message.contains("ASCII")),
        other => panic!("Expected UnsupportedPayload, got {:?}", other),
    }
}

#[test]
fn test_non_ascii_reg_no_still_renders_as_qr() {
    let rendered = render_code(&record("ÄBC-001"), CodeType::Qr).unwrap();
    assert!(rendered.payload.contains("Reg No: ÄBC-001"));
}

#[test]
fn test_barcode_rejects_overlong_payload() {
    let reg_no = "A".repeat(BARCODE_MAX_LEN + 1);
    assert!(matches!(
        render_barcode(&reg_no),
        Err(CodeError::UnsupportedPayload(_))
    ));

    let reg_no = "A".repeat(BARCODE_MAX_LEN);
    assert!(render_barcode(&reg_no).is_ok());
}

#[test]
fn test_qr_rejects_payload_over_capacity() {
    let payload = "x".repeat(8000);
    assert!(matches!(render_qr(&payload), Err(CodeError::QrEncoding(_))));
}

#[test]
fn test_rendering_is_deterministic() {
    let first = render_code(&record("ABC-003"), CodeType::Qr).unwrap();
    let second = render_code(&record("ABC-003"), CodeType::Qr).unwrap();

    assert_eq!(first.payload, second.payload);
    assert_eq!(first.png, second.png);
}
