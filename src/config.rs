use std::str::FromStr;

use crate::aggregate::{DEFAULT_HISTOGRAM_WINDOW, DEFAULT_TREND_WINDOW};
use crate::generator::SampleConfig;
use crate::summary::SpeedLimits;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub sample: SampleConfig,
    pub seed: Option<u64>,
    pub histogram_window: usize,
    pub trend_window: usize,
    pub latest_limit: usize,
    pub limits: SpeedLimits,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            sample: SampleConfig::default(),
            seed: None,
            histogram_window: DEFAULT_HISTOGRAM_WINDOW,
            trend_window: DEFAULT_TREND_WINDOW,
            latest_limit: 5,
            limits: SpeedLimits::new(),
        }
    }
}

impl AnalyticsConfig {
    /// Read overrides from the environment. A malformed `SPEED_LIMITS` is an
    /// error rather than silently meaning "no limits".
    pub fn from_env() -> Result<Self, String> {
        let base = Self::default();
        let count = env_parse("SAMPLE_COUNT").unwrap_or(base.sample.count);
        let lookback_hours = env_parse("LOOKBACK_HOURS").unwrap_or(base.sample.lookback_hours);
        let histogram_window = env_parse("HISTOGRAM_WINDOW").unwrap_or(base.histogram_window);
        let trend_window = env_parse("TREND_WINDOW").unwrap_or(base.trend_window);
        let latest_limit = env_parse("LATEST_LIMIT").unwrap_or(base.latest_limit);
        let limits = match std::env::var("SPEED_LIMITS") {
            Ok(spec) => SpeedLimits::parse(&spec)?,
            Err(_) => base.limits,
        };
        Ok(Self {
            sample: SampleConfig {
                count,
                lookback_hours,
                ..base.sample
            },
            seed: env_parse("SAMPLE_SEED"),
            histogram_window,
            trend_window,
            latest_limit,
            limits,
        })
    }
}

/// Unset or unparsable values fall back to the default.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let cfg = AnalyticsConfig::default();
        assert_eq!(cfg.sample.count, 360);
        assert_eq!(cfg.sample.lookback_hours, 72);
        assert_eq!(cfg.histogram_window, 12);
        assert_eq!(cfg.trend_window, 24);
        assert!(cfg.limits.is_empty());
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn env_values_parse_or_fall_back() {
        std::env::set_var("CANOPY_TEST_WINDOW", " 6 ");
        std::env::set_var("CANOPY_TEST_BAD", "six");
        assert_eq!(env_parse::<usize>("CANOPY_TEST_WINDOW"), Some(6));
        assert_eq!(env_parse::<usize>("CANOPY_TEST_BAD"), None);
        assert_eq!(env_parse::<usize>("CANOPY_TEST_UNSET"), None);
    }
}
