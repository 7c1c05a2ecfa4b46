use canopy_analytics::data::{file_sha256, load_csv, validate_schema, write_csv, EXPECTED_COLUMNS};
use canopy_analytics::generator::{generate_seeded, SampleConfig};
use canopy_analytics::timestamp::CaptureTime;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(path: &Path, header: &[&str], rows: &[&str]) {
    let mut out = String::new();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

#[test]
fn schema_accepts_good_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("good.csv");
    write_file(
        &path,
        &EXPECTED_COLUMNS,
        &["CAN-1234,Tricycle,Up,1,2,20240101070000,55,Normal Data,None,Plate Picture,Picture1"],
    );
    let report = validate_schema(&path).unwrap();
    assert!(report.ok);
}

#[test]
fn schema_rejects_bad_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    write_file(&path, &["plate_number", "speed"], &["CAN-1234,55"]);
    let report = validate_schema(&path).unwrap();
    assert!(!report.ok);
}

#[test]
fn bad_rows_are_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.csv");
    write_file(
        &path,
        &EXPECTED_COLUMNS,
        &[
            "# comment line",
            "CAN-1111,Tricycle,Up,1,2,20240101070000,55,Normal Data,None,Plate Picture,Picture1",
            "CAN-2222,Oversize Vehicle,Down,2,1,2024010107,70,Normal Data,None,Plate Picture,Picture1",
            "",
            "CAN-3333,Light-duty Vehicle,Down,3,3,20240102180000,91,Normal Data,None,Plate Picture,Picture1",
        ],
    );
    let (records, manifest) = load_csv(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(manifest.row_count, 2);
    assert_eq!(manifest.bad_rows, 1);
    assert_eq!(manifest.warnings.len(), 1);
    assert!(manifest.warnings[0].contains("capture_time"));
    assert_eq!(manifest.latest.as_deref(), Some("20240102180000"));
    assert_eq!(manifest.earliest.as_deref(), Some("20240101070000"));
    assert_eq!(records[0].plate_number, "CAN-3333");
}

#[test]
fn missing_header_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noheader.csv");
    fs::write(&path, "CAN-1111,Tricycle,Up,1,2,20240101070000,55,Normal Data,None,Plate Picture,Picture1\n").unwrap();
    let (records, manifest) = load_csv(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert!(manifest.warnings.iter().any(|w| w == "missing_header"));
}

#[test]
fn generated_samples_survive_a_file_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("samples.csv");
    let now = CaptureTime::parse("20241018120000").unwrap().datetime();
    let records = generate_seeded(&SampleConfig::default(), now, 17);
    write_csv(&path, &records).unwrap();

    let (loaded, manifest) = load_csv(&path).unwrap();
    assert_eq!(manifest.bad_rows, 0);
    assert_eq!(manifest.hash_sha256, file_sha256(&path).unwrap());
    assert_eq!(manifest.hash_sha256.len(), 64);
    assert_eq!(loaded.len(), records.len());
    for (a, b) in loaded.iter().zip(&records) {
        assert_eq!(a.capture_time, b.capture_time);
    }
}

#[test]
fn picture_fields_survive_a_file_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pictures.csv");
    let now = CaptureTime::parse("20241018120000").unwrap().datetime();
    let mut records = generate_seeded(&SampleConfig { count: 3, ..SampleConfig::default() }, now, 23);
    records[0].plate_number = "MH12 AB 1023".to_string();
    records[1].picture = "cam7/frame.jpg".to_string();
    records[2].plate_picture = "cam7/plate.jpg".to_string();
    write_csv(&path, &records).unwrap();

    let (loaded, manifest) = load_csv(&path).unwrap();
    assert_eq!(manifest.bad_rows, 0);
    assert_eq!(loaded, records);
}

#[test]
fn comma_in_plate_is_refused_on_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("comma.csv");
    let now = CaptureTime::parse("20241018120000").unwrap().datetime();
    let mut records = generate_seeded(&SampleConfig { count: 3, ..SampleConfig::default() }, now, 29);
    records[0].plate_number = "MH12,AB 1023".to_string();
    assert!(write_csv(&path, &records).is_err());
    assert!(!path.exists());
}

#[test]
fn invalid_utf8_row_is_a_bad_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bytes.csv");
    let mut bytes = EXPECTED_COLUMNS.join(",").into_bytes();
    bytes.extend_from_slice(b"\nCAN-1111,Tricycle,Up,1,2,20240101070000,55,Normal Data,None,Plate Picture,Picture1\n");
    bytes.extend_from_slice(b"CAN-\xff\xfe,Tricycle,Up,1,2,20240101080000,55,Normal Data,None,Plate Picture,Picture1\n");
    bytes.extend_from_slice(b"CAN-3333,Tricycle,Down,2,1,20240101090000,61,Normal Data,None,Plate Picture,Picture1\n");
    fs::write(&path, bytes).unwrap();

    let (records, manifest) = load_csv(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(manifest.bad_rows, 1);
    assert!(manifest.warnings[0].starts_with("bad_row line=3"), "{:?}", manifest.warnings);
    assert!(validate_schema(&path).unwrap().ok);
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_csv(&dir.path().join("nope.csv")).is_err());
}
