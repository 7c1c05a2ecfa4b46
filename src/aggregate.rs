//! Bucket aggregators over a detection list.
//!
//! All three reducers are pure: they borrow the list, never mutate it, and
//! always return a correctly shaped result (empty input gives zero buckets).
//! Records whose capture time does not decode are left out of the pass.

use serde::{Deserialize, Serialize};

use crate::record::DetectionRecord;
use crate::timestamp::decode_hour;

pub const DEFAULT_HISTOGRAM_WINDOW: usize = 12;
pub const DEFAULT_TREND_WINDOW: usize = 24;
/// Keeps the trend chart scale stable when every hour is slow.
pub const TREND_SCALE_FLOOR: f64 = 60.0;

pub const DAYS: usize = 7;
pub const HOURS: usize = 24;

/// The trailing `window` hour labels ending at `now_hour`, oldest first,
/// wrapping across midnight.
pub fn hour_labels(window: usize, now_hour: u32) -> Vec<u32> {
    let now = i64::from(now_hour % 24);
    let start = now - window as i64 + 1;
    (0..window as i64)
        .map(|i| (start + i).rem_euclid(24) as u32)
        .collect()
}

// First match wins when a window longer than a day repeats labels.
fn slot(labels: &[u32], record: &DetectionRecord) -> Option<usize> {
    let hour = decode_hour(&record.capture_time).ok()?;
    labels.iter().position(|&h| h == hour)
}

// =============================================================================
// Hourly count histogram
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyHistogram {
    pub labels: Vec<u32>,
    pub counts: Vec<u32>,
    /// Never below 1 so bar heights can be normalized without a zero check.
    pub max_count: u32,
}

impl HourlyHistogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Bar height in `[0, 1]` for position `idx`.
    pub fn normalized(&self, idx: usize) -> f64 {
        self.counts
            .get(idx)
            .map(|&c| f64::from(c) / f64::from(self.max_count))
            .unwrap_or(0.0)
    }
}

pub fn hourly_histogram(records: &[DetectionRecord], window: usize, now_hour: u32) -> HourlyHistogram {
    let labels = hour_labels(window, now_hour);
    let mut counts = vec![0u32; labels.len()];
    for rec in records {
        if let Some(idx) = slot(&labels, rec) {
            counts[idx] += 1;
        }
    }
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    HourlyHistogram {
        labels,
        counts,
        max_count,
    }
}

// =============================================================================
// Hourly average-speed trend
// =============================================================================

/// An average of 0 with a count of 0 means "no data", not a standstill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTrend {
    pub labels: Vec<u32>,
    pub averages: Vec<f64>,
    pub counts: Vec<u32>,
    pub max_value: f64,
}

pub fn hourly_speed_trend(records: &[DetectionRecord], window: usize, now_hour: u32) -> SpeedTrend {
    let labels = hour_labels(window, now_hour);
    let mut sums = vec![0u64; labels.len()];
    let mut counts = vec![0u32; labels.len()];
    for rec in records {
        if let Some(idx) = slot(&labels, rec) {
            sums[idx] += u64::from(rec.speed);
            counts[idx] += 1;
        }
    }
    let averages: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &n)| if n == 0 { 0.0 } else { sum as f64 / f64::from(n) })
        .collect();
    let max_value = averages.iter().copied().fold(TREND_SCALE_FLOOR, f64::max);
    SpeedTrend {
        labels,
        averages,
        counts,
        max_value,
    }
}

// =============================================================================
// Weekly intensity matrix
// =============================================================================

/// Day-by-hour counts. Stricter than the hourly passes: the weekday needs a
/// real calendar date, so a stamp whose hour decodes but whose date does not
/// (e.g. Feb 29 in a common year) is counted there and skipped here. Anything
/// after the leading 14 digits is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHeatmap {
    /// Rows Monday..Sunday, columns hour 0..23.
    pub cells: [[u32; HOURS]; DAYS],
    pub max: u32,
}

impl WeeklyHeatmap {
    pub fn get(&self, day: usize, hour: usize) -> u32 {
        self.cells
            .get(day)
            .and_then(|row| row.get(hour))
            .copied()
            .unwrap_or(0)
    }

    pub fn normalized(&self, day: usize, hour: usize) -> f64 {
        f64::from(self.get(day, hour)) / f64::from(self.max)
    }

    pub fn total(&self) -> u64 {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .map(|&c| u64::from(c))
            .sum()
    }
}

pub fn weekly_heatmap(records: &[DetectionRecord]) -> WeeklyHeatmap {
    let mut cells = [[0u32; HOURS]; DAYS];
    for rec in records {
        let Ok(at) = rec.capture_prefix() else {
            continue;
        };
        cells[at.weekday_index()][at.hour() as usize] += 1;
    }
    let max = cells
        .iter()
        .flat_map(|row| row.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);
    WeeklyHeatmap { cells, max }
}
