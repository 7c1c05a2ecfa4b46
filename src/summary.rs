//! Headline figures for the dashboard stat cards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::DetectionRecord;

/// Posted speed limits keyed by lane. Lanes without an entry are never
/// flagged; there is no fallback threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub by_lane: BTreeMap<u8, u32>,
}

impl SpeedLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lane(mut self, lane: u8, kmh: u32) -> Self {
        self.by_lane.insert(lane, kmh);
        self
    }

    /// Parse `"1:60,2:80"`. Malformed pairs are reported, not skipped.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let mut limits = Self::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (lane, kmh) = pair
                .split_once(':')
                .ok_or_else(|| format!("bad limit pair (want lane:kmh): {}", pair))?;
            let lane: u8 = lane
                .trim()
                .parse()
                .map_err(|e| format!("bad lane in {}: {}", pair, e))?;
            let kmh: u32 = kmh
                .trim()
                .parse()
                .map_err(|e| format!("bad limit in {}: {}", pair, e))?;
            limits.by_lane.insert(lane, kmh);
        }
        Ok(limits)
    }

    pub fn limit_for(&self, lane: u8) -> Option<u32> {
        self.by_lane.get(&lane).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lane.is_empty()
    }

    /// Limit broken by `rec`, if any.
    pub fn exceeded_by(&self, rec: &DetectionRecord) -> Option<u32> {
        self.limit_for(rec.lane).filter(|&limit| rec.speed > limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub plate_number: String,
    pub lane: u8,
    pub capture_time: String,
    pub speed: u32,
    pub limit: u32,
    pub excess: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_records: usize,
    pub peak_speed: Option<u32>,
    pub mean_speed: Option<f64>,
    pub violations: usize,
}

pub fn summarize(records: &[DetectionRecord], limits: &SpeedLimits) -> DashboardSummary {
    let peak_speed = records.iter().map(|r| r.speed).max();
    let mean_speed = if records.is_empty() {
        None
    } else {
        let sum: u64 = records.iter().map(|r| u64::from(r.speed)).sum();
        Some(sum as f64 / records.len() as f64)
    };
    let violations = records.iter().filter(|r| limits.exceeded_by(r).is_some()).count();
    DashboardSummary {
        total_records: records.len(),
        peak_speed,
        mean_speed,
        violations,
    }
}

/// The `n` most recent violations, newest first regardless of input order.
pub fn latest_violations(records: &[DetectionRecord], limits: &SpeedLimits, n: usize) -> Vec<Violation> {
    let mut hits: Vec<Violation> = records
        .iter()
        .filter_map(|r| {
            limits.exceeded_by(r).map(|limit| Violation {
                plate_number: r.plate_number.clone(),
                lane: r.lane,
                capture_time: r.capture_time.clone(),
                speed: r.speed,
                limit,
                excess: r.speed - limit,
            })
        })
        .collect();
    hits.sort_by(|a, b| b.capture_time.cmp(&a.capture_time));
    hits.truncate(n);
    hits
}
