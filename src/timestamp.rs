//! Capture-time codec for the fixed-width `YYYYMMDDHHMMSS` stamp.
//!
//! Field decoders work on raw strings at fixed offsets so a record can be
//! bucketed by hour without full calendar validation. `CaptureTime` is the
//! validated form used where the full date matters (weekday derivation).

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STAMP_LEN: usize = 14;

const YEAR: (usize, usize) = (0, 4);
const MONTH: (usize, usize) = (4, 6);
const DAY: (usize, usize) = (6, 8);
const HOUR: (usize, usize) = (8, 10);
const MINUTE: (usize, usize) = (10, 12);
const SECOND: (usize, usize) = (12, 14);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    TooShort { len: usize, needed: usize },
    BadLength { len: usize },
    NonNumeric { field: &'static str },
    OutOfRange { field: &'static str, value: u32 },
    InvalidDate { stamp: String },
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::TooShort { len, needed } => {
                write!(f, "timestamp too short: {} chars, need {}", len, needed)
            }
            TimestampError::BadLength { len } => {
                write!(f, "timestamp must be {} chars, got {}", STAMP_LEN, len)
            }
            TimestampError::NonNumeric { field } => write!(f, "non-numeric {} field", field),
            TimestampError::OutOfRange { field, value } => {
                write!(f, "{} out of range: {}", field, value)
            }
            TimestampError::InvalidDate { stamp } => write!(f, "not a calendar date: {}", stamp),
        }
    }
}

impl std::error::Error for TimestampError {}

/// Pack calendar fields into a 14-digit stamp.
pub fn encode(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> String {
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        year, month, day, hour, minute, second
    )
}

fn field(stamp: &str, (start, end): (usize, usize), name: &'static str) -> Result<u32, TimestampError> {
    let bytes = stamp.as_bytes();
    if bytes.len() < end {
        return Err(TimestampError::TooShort {
            len: bytes.len(),
            needed: end,
        });
    }
    let digits = &bytes[start..end];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(TimestampError::NonNumeric { field: name });
    }
    Ok(digits
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0')))
}

fn bounded(value: u32, lo: u32, hi: u32, name: &'static str) -> Result<u32, TimestampError> {
    if value < lo || value > hi {
        return Err(TimestampError::OutOfRange { field: name, value });
    }
    Ok(value)
}

pub fn decode_year(stamp: &str) -> Result<u32, TimestampError> {
    field(stamp, YEAR, "year")
}

pub fn decode_month(stamp: &str) -> Result<u32, TimestampError> {
    bounded(field(stamp, MONTH, "month")?, 1, 12, "month")
}

pub fn decode_day(stamp: &str) -> Result<u32, TimestampError> {
    bounded(field(stamp, DAY, "day")?, 1, 31, "day")
}

/// Hour of day in `0..=23`, read from offsets 8..10.
pub fn decode_hour(stamp: &str) -> Result<u32, TimestampError> {
    bounded(field(stamp, HOUR, "hour")?, 0, 23, "hour")
}

pub fn decode_minute(stamp: &str) -> Result<u32, TimestampError> {
    bounded(field(stamp, MINUTE, "minute")?, 0, 59, "minute")
}

pub fn decode_second(stamp: &str) -> Result<u32, TimestampError> {
    bounded(field(stamp, SECOND, "second")?, 0, 59, "second")
}

/// A capture time that has been checked once: exactly 14 digits forming a
/// real calendar date and time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaptureTime(NaiveDateTime);

impl CaptureTime {
    pub fn parse(stamp: &str) -> Result<Self, TimestampError> {
        if stamp.len() != STAMP_LEN {
            return Err(TimestampError::BadLength { len: stamp.len() });
        }
        let year = decode_year(stamp)?;
        let month = decode_month(stamp)?;
        let day = decode_day(stamp)?;
        let hour = decode_hour(stamp)?;
        let minute = decode_minute(stamp)?;
        let second = decode_second(stamp)?;
        NaiveDate::from_ymd_opt(year as i32, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .map(CaptureTime)
            .ok_or_else(|| TimestampError::InvalidDate {
                stamp: stamp.to_string(),
            })
    }

    /// Like `parse`, but reads only the leading 14 characters so trailing
    /// data after a well-formed stamp is ignored. Shorter input still fails.
    pub fn parse_prefix(stamp: &str) -> Result<Self, TimestampError> {
        match stamp.get(..STAMP_LEN) {
            Some(head) => Self::parse(head),
            None if stamp.len() < STAMP_LEN => Err(TimestampError::TooShort {
                len: stamp.len(),
                needed: STAMP_LEN,
            }),
            None => Err(TimestampError::NonNumeric { field: "second" }),
        }
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        // Sub-second precision is not representable in the stamp.
        CaptureTime(dt.with_nanosecond(0).unwrap_or(dt))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Monday = 0 ... Sunday = 6.
    pub fn weekday_index(&self) -> usize {
        let sunday_first = self.0.weekday().num_days_from_sunday() as usize;
        (sunday_first + 6) % 7
    }

    pub fn to_stamp(&self) -> String {
        let dt = self.0;
        encode(
            dt.year().max(0) as u32,
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
        )
    }
}

impl fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stamp())
    }
}

impl TryFrom<String> for CaptureTime {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CaptureTime::parse(&value)
    }
}

impl From<CaptureTime> for String {
    fn from(value: CaptureTime) -> Self {
        value.to_stamp()
    }
}
