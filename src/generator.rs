//! Synthetic detection samples for development and demos.
//!
//! Records are spread uniformly over a look-back window ending at `now`, with
//! speeds pushed up during rush hours and down otherwise.

use chrono::{Duration, NaiveDateTime, Timelike};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::record::{sort_newest_first, DetectionRecord, Direction, VehicleType};
use crate::timestamp::CaptureTime;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub lookback_hours: u32,
    pub speed_min: f64,
    pub speed_max: f64,
    pub rush_hours: Vec<u32>,
    pub rush_factor: f64,
    pub off_peak_factor: f64,
    pub noise: f64,
    pub channels: u8,
    pub lanes: u8,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 360,
            lookback_hours: 72,
            speed_min: 20.0,
            speed_max: 90.0,
            rush_hours: vec![7, 8, 9, 17, 18, 19],
            rush_factor: 1.2,
            off_peak_factor: 0.9,
            noise: 4.0,
            channels: 4,
            lanes: 3,
        }
    }
}

impl SampleConfig {
    pub fn speed_factor(&self, hour: u32) -> f64 {
        if self.rush_hours.contains(&hour) {
            self.rush_factor
        } else {
            self.off_peak_factor
        }
    }
}

pub fn generate<R: Rng + ?Sized>(cfg: &SampleConfig, now: NaiveDateTime, rng: &mut R) -> Vec<DetectionRecord> {
    let window_ms = i64::from(cfg.lookback_hours) * 3_600_000;
    let mut out = Vec::with_capacity(cfg.count);
    for _ in 0..cfg.count {
        let offset = if window_ms > 0 { rng.gen_range(0..window_ms) } else { 0 };
        let at = CaptureTime::from_datetime(now - Duration::milliseconds(offset));

        let base = if cfg.speed_max > cfg.speed_min {
            rng.gen_range(cfg.speed_min..cfg.speed_max)
        } else {
            cfg.speed_min
        };
        let noise = if cfg.noise > 0.0 {
            rng.gen_range(-cfg.noise..cfg.noise)
        } else {
            0.0
        };
        let speed = (base * cfg.speed_factor(at.datetime().hour()) + noise).max(0.0).round() as u32;

        out.push(DetectionRecord {
            plate_number: format!("CAN-{}", rng.gen_range(1000..=9999)),
            vehicle_type: VehicleType::ALL[rng.gen_range(0..VehicleType::ALL.len())],
            direction: Direction::ALL[rng.gen_range(0..Direction::ALL.len())],
            channel: rng.gen_range(1..=cfg.channels.max(1)),
            lane: rng.gen_range(1..=cfg.lanes.max(1)),
            capture_time: at.to_stamp(),
            speed,
            data_type: "Normal Data".to_string(),
            list_type: "None".to_string(),
            plate_picture: "Plate Picture".to_string(),
            picture: "Picture1".to_string(),
        });
    }
    sort_newest_first(&mut out);
    out
}

pub fn generate_seeded(cfg: &SampleConfig, now: NaiveDateTime, seed: u64) -> Vec<DetectionRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(cfg, now, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::decode_hour;

    fn now() -> NaiveDateTime {
        CaptureTime::parse("20241018143000").unwrap().datetime()
    }

    #[test]
    fn produces_requested_count_sorted_newest_first() {
        let recs = generate_seeded(&SampleConfig::default(), now(), 7);
        assert_eq!(recs.len(), 360);
        for pair in recs.windows(2) {
            assert!(pair[0].capture_time >= pair[1].capture_time);
        }
    }

    #[test]
    fn stamps_stay_inside_window() {
        let cfg = SampleConfig::default();
        let recs = generate_seeded(&cfg, now(), 11);
        let earliest = now() - Duration::hours(i64::from(cfg.lookback_hours));
        for r in &recs {
            assert_eq!(r.capture_time.len(), 14);
            let t = r.capture().unwrap().datetime();
            assert!(t <= now() && t >= earliest, "{} outside window", r.capture_time);
        }
    }

    #[test]
    fn categorical_fields_within_closed_sets() {
        let recs = generate_seeded(&SampleConfig::default(), now(), 3);
        for r in &recs {
            assert!((1..=4).contains(&r.channel));
            assert!((1..=3).contains(&r.lane));
            assert!(r.plate_number.starts_with("CAN-"));
            let n: u32 = r.plate_number[4..].parse().unwrap();
            assert!((1000..=9999).contains(&n));
        }
    }

    #[test]
    fn speeds_respect_hour_factor_bounds() {
        let cfg = SampleConfig::default();
        let recs = generate_seeded(&cfg, now(), 5);
        for r in &recs {
            let factor = cfg.speed_factor(decode_hour(&r.capture_time).unwrap());
            let hi = (cfg.speed_max * factor + cfg.noise).round() as u32;
            let lo = (cfg.speed_min * factor - cfg.noise).max(0.0).round() as u32;
            assert!(r.speed >= lo && r.speed <= hi, "speed {} not in {}..={}", r.speed, lo, hi);
        }
    }

    #[test]
    fn same_seed_same_output() {
        let cfg = SampleConfig::default();
        assert_eq!(generate_seeded(&cfg, now(), 42), generate_seeded(&cfg, now(), 42));
    }

    #[test]
    fn negative_speeds_clamp_to_zero() {
        let cfg = SampleConfig {
            count: 50,
            speed_min: 0.0,
            speed_max: 0.5,
            noise: 10.0,
            ..SampleConfig::default()
        };
        let recs = generate_seeded(&cfg, now(), 9);
        assert!(recs.iter().any(|r| r.speed == 0));
    }

    #[test]
    fn zero_window_stamps_everything_at_now() {
        let cfg = SampleConfig {
            count: 5,
            lookback_hours: 0,
            ..SampleConfig::default()
        };
        let recs = generate_seeded(&cfg, now(), 1);
        assert!(recs.iter().all(|r| r.capture_time == "20241018143000"));
    }
}
