use serde::{Deserialize, Serialize};

use crate::timestamp::{CaptureTime, TimestampError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "Light-duty Vehicle")]
    LightDuty,
    #[serde(rename = "Oversize Vehicle")]
    Oversize,
    #[serde(rename = "Tricycle")]
    Tricycle,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::LightDuty, VehicleType::Oversize, VehicleType::Tricycle];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::LightDuty => "Light-duty Vehicle",
            VehicleType::Oversize => "Oversize Vehicle",
            VehicleType::Tricycle => "Tricycle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Travel direction relative to the camera: `Up` is inbound, `Down` outbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

/// One camera detection. Channel, lane and speed travel as strings on the
/// wire but are held as integers here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub plate_number: String,
    pub vehicle_type: VehicleType,
    pub direction: Direction,
    #[serde(with = "as_string")]
    pub channel: u8,
    #[serde(with = "as_string")]
    pub lane: u8,
    pub capture_time: String,
    #[serde(with = "as_string")]
    pub speed: u32,
    pub data_type: String,
    pub list_type: String,
    pub plate_picture: String,
    pub picture: String,
}

impl DetectionRecord {
    pub fn capture(&self) -> Result<CaptureTime, TimestampError> {
        CaptureTime::parse(&self.capture_time)
    }

    /// The leading 14-digit stamp, ignoring anything after it.
    pub fn capture_prefix(&self) -> Result<CaptureTime, TimestampError> {
        CaptureTime::parse_prefix(&self.capture_time)
    }
}

/// Newest first. The stamp is fixed-width and zero-padded, so string order is
/// chronological order.
pub fn sort_newest_first(records: &mut [DetectionRecord]) {
    records.sort_by(|a, b| b.capture_time.cmp(&a.capture_time));
}

mod as_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        raw.trim().parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
pub(crate) fn sample(capture_time: &str, speed: u32) -> DetectionRecord {
    DetectionRecord {
        plate_number: "CAN-1000".to_string(),
        vehicle_type: VehicleType::LightDuty,
        direction: Direction::Up,
        channel: 1,
        lane: 1,
        capture_time: capture_time.to_string(),
        speed,
        data_type: "Normal Data".to_string(),
        list_type: "None".to_string(),
        plate_picture: "Plate Picture".to_string(),
        picture: "Picture1".to_string(),
    }
}
