use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{Local, Timelike};
use serde_json::json;

use canopy_analytics::config::AnalyticsConfig;
use canopy_analytics::data::load_csv;
use canopy_analytics::generator::{generate, generate_seeded};
use canopy_analytics::logging::{json_log, log_generated, log_ingest, obj, v_str};
use canopy_analytics::report::DashboardReport;

fn main() -> Result<()> {
    let cfg = AnalyticsConfig::from_env().map_err(|e| anyhow!("config: {}", e))?;
    let now = Local::now().naive_local();

    let records = match std::env::args().nth(1) {
        Some(path) => {
            let (records, manifest) = load_csv(Path::new(&path)).map_err(|e| anyhow!("{}: {}", path, e))?;
            log_ingest(&manifest.path, manifest.row_count, manifest.bad_rows, manifest.warnings.len());
            records
        }
        None => {
            let records = match cfg.seed {
                Some(seed) => generate_seeded(&cfg.sample, now, seed),
                None => generate(&cfg.sample, now, &mut rand::thread_rng()),
            };
            log_generated(records.len(), cfg.sample.lookback_hours, cfg.seed);
            records
        }
    };

    let report = DashboardReport::build(&records, &cfg, now.hour());
    println!("{}", serde_json::to_string_pretty(&report)?);

    json_log(
        "system",
        obj(&[("msg", v_str("done")), ("records", json!(records.len()))]),
    );
    Ok(())
}
