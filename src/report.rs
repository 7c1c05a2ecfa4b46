use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::aggregate::{hourly_histogram, hourly_speed_trend, weekly_heatmap, HourlyHistogram, SpeedTrend, WeeklyHeatmap};
use crate::config::AnalyticsConfig;
use crate::logging::{log, log_skipped, obj, Domain, Level, ProfileScope};
use crate::record::DetectionRecord;
use crate::summary::{latest_violations, summarize, DashboardSummary, Violation};
use crate::timestamp::decode_hour;

/// Everything the dashboard draws, computed from one record list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub now_hour: u32,
    pub summary: DashboardSummary,
    pub histogram: HourlyHistogram,
    pub trend: SpeedTrend,
    pub heatmap: WeeklyHeatmap,
    pub latest_violations: Vec<Violation>,
}

impl DashboardReport {
    pub fn build(records: &[DetectionRecord], cfg: &AnalyticsConfig, now_hour: u32) -> Self {
        let _scope = ProfileScope::with_context("report.build", &[("records", json!(records.len()))]);

        let undecodable_hours = records.iter().filter(|r| decode_hour(&r.capture_time).is_err()).count();
        let invalid_dates = records.iter().filter(|r| r.capture_prefix().is_err()).count();
        log_skipped("hourly", undecodable_hours, records.len());
        log_skipped("weekly", invalid_dates, records.len());

        let report = Self {
            now_hour,
            summary: summarize(records, &cfg.limits),
            histogram: hourly_histogram(records, cfg.histogram_window, now_hour),
            trend: hourly_speed_trend(records, cfg.trend_window, now_hour),
            heatmap: weekly_heatmap(records),
            latest_violations: latest_violations(records, &cfg.limits, cfg.latest_limit),
        };
        log(
            Level::Info,
            Domain::Report,
            "report_built",
            obj(&[
                ("records", json!(records.len())),
                ("violations", json!(report.summary.violations)),
                ("histogram_window", json!(cfg.histogram_window)),
                ("trend_window", json!(cfg.trend_window)),
            ]),
        );
        report
    }
}
