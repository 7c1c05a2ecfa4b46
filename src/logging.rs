//! Structured JSON-line logging.
//!
//! Every entry carries a run id, a monotonically increasing sequence number,
//! a level and a domain. Entries go to stderr so stdout stays free for
//! reports.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Generator, // Synthetic sample production
    Ingest,    // File loading, schema checks
    Aggregate, // Bucket passes
    Report,    // Report assembly and output
    System,    // Startup, shutdown
    Profile,   // Timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Generator => "generator",
            Domain::Ingest => "ingest",
            Domain::Aggregate => "aggregate",
            Domain::Report => "report",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS is a comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static PROFILE_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_ID: OnceLock<String> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

pub fn run_id() -> &'static str {
    RUN_ID.get_or_init(|| {
        std::env::var("RUN_ID").unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()))
    })
}

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

// =============================================================================
// Core logging functions
// =============================================================================

pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

/// Info-level entry tagged with a free-form component name.
pub fn json_log(component: &str, fields: Map<String, Value>) {
    emit_record(Level::Info, component, component, fields);
}

fn build_record(level: Level, component: &str, event: &str, mut fields: Map<String, Value>) -> Value {
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let line = build_record(level, component, event, fields).to_string();
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

// =============================================================================
// Domain helpers
// =============================================================================

pub fn log_generated(count: usize, lookback_hours: u32, seed: Option<u64>) {
    log(
        Level::Info,
        Domain::Generator,
        "samples_generated",
        obj(&[
            ("count", json!(count)),
            ("lookback_hours", json!(lookback_hours)),
            ("seed", seed.map(|s| json!(s)).unwrap_or(Value::Null)),
        ]),
    );
}

pub fn log_ingest(path: &str, rows: u64, bad_rows: u64, warnings: usize) {
    let level = if bad_rows > 0 { Level::Warn } else { Level::Info };
    log(
        level,
        Domain::Ingest,
        "dataset_loaded",
        obj(&[
            ("path", v_str(path)),
            ("rows", json!(rows)),
            ("bad_rows", json!(bad_rows)),
            ("warnings", json!(warnings)),
        ]),
    );
}

/// Records skipped by a bucket pass because their stamp did not decode.
pub fn log_skipped(pass: &str, skipped: usize, total: usize) {
    if skipped == 0 {
        return;
    }
    log(
        Level::Debug,
        Domain::Aggregate,
        "records_skipped",
        obj(&[
            ("pass", v_str(pass)),
            ("skipped", json!(skipped)),
            ("total", json!(total)),
        ]),
    );
}

// =============================================================================
// Helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits elapsed wall time as a trace entry on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Option<Map<String, Value>>,
    started: Instant,
    enabled: bool,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        let enabled = Self::should_sample();
        Self {
            label,
            context: if enabled { Some(obj(fields)) } else { None },
            started: Instant::now(),
            enabled,
        }
    }

    fn should_sample() -> bool {
        std::env::var("PROFILE_SAMPLE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .map(|p| {
                if p >= 1.0 {
                    true
                } else if p <= 0.0 {
                    false
                } else {
                    let seq = PROFILE_SEQ.fetch_add(1, Ordering::SeqCst);
                    let bucket = (seq % 10_000) as f64 / 10_000.0;
                    bucket < p
                }
            })
            .unwrap_or(true)
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = self.context.take().unwrap_or_default();
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_record_shape() {
        let rec = build_record(
            Level::Warn,
            "ingest",
            "dataset_loaded",
            obj(&[("msg", v_str("two bad rows")), ("bad_rows", json!(2))]),
        );
        assert_eq!(rec["lvl"], "WARN");
        assert_eq!(rec["component"], "ingest");
        assert_eq!(rec["msg"], "two bad rows");
        assert_eq!(rec["data"]["bad_rows"], 2);
        assert!(rec["data"].get("msg").is_none());
        assert_eq!(rec["run_id"], run_id());
    }
}
