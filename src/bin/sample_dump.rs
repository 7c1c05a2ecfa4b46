use std::path::Path;

use chrono::Local;

use canopy_analytics::config::AnalyticsConfig;
use canopy_analytics::data::write_csv;
use canopy_analytics::generator::{generate, generate_seeded};
use canopy_analytics::logging::log_generated;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "samples.csv".to_string());
    let cfg = match AnalyticsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("bad config: {}", err);
            std::process::exit(2);
        }
    };
    let now = Local::now().naive_local();
    let records = match cfg.seed {
        Some(seed) => generate_seeded(&cfg.sample, now, seed),
        None => generate(&cfg.sample, now, &mut rand::thread_rng()),
    };
    log_generated(records.len(), cfg.sample.lookback_hours, cfg.seed);

    if let Err(err) = write_csv(Path::new(&path), &records) {
        eprintln!("failed to write {}: {}", path, err);
        std::process::exit(1);
    }
    eprintln!("wrote {} samples to {}", records.len(), path);
}
