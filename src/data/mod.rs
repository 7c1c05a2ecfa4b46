use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::record::{sort_newest_first, DetectionRecord, Direction, VehicleType};
use crate::timestamp::CaptureTime;

pub const EXPECTED_COLUMNS: [&str; 11] = [
    "plate_number",
    "vehicle_type",
    "direction",
    "channel",
    "lane",
    "capture_time",
    "speed",
    "data_type",
    "list_type",
    "plate_picture",
    "picture",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub bad_rows: u64,
    pub earliest: Option<String>,
    pub latest: Option<String>,
    pub columns: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub ok: bool,
    pub message: String,
}

fn is_header(line: &str) -> bool {
    line.to_lowercase().starts_with("plate_number,")
}

/// Lines decoded one at a time so a row with invalid UTF-8 is a bad row, not
/// a failed read. I/O errors end the iteration.
fn raw_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = Result<String, String>> {
    std::iter::from_fn(move || {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(String::from_utf8(buf).map_err(|e| format!("invalid utf-8: {}", e))),
        }
    })
}

/// Load detection records from a CSV file. Bad rows are counted and noted in
/// the manifest warnings; they never fail the load.
pub fn load_csv(path: &Path) -> Result<(Vec<DetectionRecord>, DatasetManifest), String> {
    let hash = file_sha256(path)?;
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut bad_rows = 0u64;
    let mut header: Vec<String> = Vec::new();

    for (lineno, line) in raw_lines(reader).enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                bad_rows += 1;
                warnings.push(format!("bad_row line={}: {}", lineno + 1, err));
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if is_header(trimmed) && header.is_empty() {
            header = trimmed.split(',').map(|s| s.trim().to_string()).collect();
            continue;
        }
        match parse_row(trimmed) {
            Ok(rec) => records.push(rec),
            Err(err) => {
                bad_rows += 1;
                warnings.push(format!("bad_row line={}: {}", lineno + 1, err));
            }
        }
    }

    if header.is_empty() {
        warnings.push("missing_header".to_string());
    }

    sort_newest_first(&mut records);
    let manifest = DatasetManifest {
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count: records.len() as u64,
        bad_rows,
        earliest: records.last().map(|r| r.capture_time.clone()),
        latest: records.first().map(|r| r.capture_time.clone()),
        columns: header,
        warnings,
    };
    Ok((records, manifest))
}

/// Parse one data row. The capture time is validated here so malformed stamps
/// never reach the aggregators from a file source.
pub fn parse_row(line: &str) -> Result<DetectionRecord, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != EXPECTED_COLUMNS.len() {
        return Err(format!(
            "expected {} columns, got {}",
            EXPECTED_COLUMNS.len(),
            parts.len()
        ));
    }
    let vehicle_type =
        VehicleType::parse(parts[1]).ok_or_else(|| format!("unknown vehicle_type: {}", parts[1]))?;
    let direction = Direction::parse(parts[2]).ok_or_else(|| format!("unknown direction: {}", parts[2]))?;
    let channel: u8 = parts[3].parse().map_err(|e| format!("bad channel: {}", e))?;
    let lane: u8 = parts[4].parse().map_err(|e| format!("bad lane: {}", e))?;
    let capture = CaptureTime::parse(parts[5]).map_err(|e| format!("bad capture_time: {}", e))?;
    let speed: u32 = parts[6].parse().map_err(|e| format!("bad speed: {}", e))?;
    Ok(DetectionRecord {
        plate_number: parts[0].to_string(),
        vehicle_type,
        direction,
        channel,
        lane,
        capture_time: capture.to_stamp(),
        speed,
        data_type: parts[7].to_string(),
        list_type: parts[8].to_string(),
        plate_picture: parts[9].to_string(),
        picture: parts[10].to_string(),
    })
}

// Fields are written unquoted, so a separator inside one would shift columns.
fn check_field(name: &str, value: &str) -> Result<(), String> {
    if value.contains([',', '\n', '\r']) {
        return Err(format!("{} contains a separator: {:?}", name, value));
    }
    Ok(())
}

fn check_record(r: &DetectionRecord) -> Result<(), String> {
    check_field("plate_number", &r.plate_number)?;
    check_field("capture_time", &r.capture_time)?;
    check_field("data_type", &r.data_type)?;
    check_field("list_type", &r.list_type)?;
    check_field("plate_picture", &r.plate_picture)?;
    check_field("picture", &r.picture)
}

/// Write records in the format `load_csv` reads. Every record is checked
/// before the file is created; a field holding `,` or a line break is an error.
pub fn write_csv(path: &Path, records: &[DetectionRecord]) -> Result<(), String> {
    for r in records {
        check_record(r).map_err(|e| format!("{}: {}", r.plate_number.escape_debug(), e))?;
    }
    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", EXPECTED_COLUMNS.join(",")).map_err(|e| e.to_string())?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            r.plate_number,
            r.vehicle_type.as_str(),
            r.direction.as_str(),
            r.channel,
            r.lane,
            r.capture_time,
            r.speed,
            r.data_type,
            r.list_type,
            r.plate_picture,
            r.picture
        )
        .map_err(|e| e.to_string())?;
    }
    out.flush().map_err(|e| e.to_string())
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport, String> {
    let header = read_header(path)?;
    let expected = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let ok = header == expected;
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: got {:?} expected {:?}", header, expected)
    };
    Ok(SchemaReport {
        columns: header,
        expected,
        ok,
        message,
    })
}

pub fn read_header(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);
    for line in raw_lines(reader) {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if is_header(trimmed) {
            return Ok(trimmed.split(',').map(|s| s.trim().to_string()).collect());
        }
        break;
    }
    Ok(Vec::new())
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| e.to_string())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
