//! Analytics core for a speed-enforcement dashboard: capture-time codec,
//! synthetic detection samples, CSV ingestion and the hourly/weekly bucket
//! aggregators the dashboard charts are drawn from.

pub mod aggregate;
pub mod config;
pub mod data;
pub mod generator;
pub mod logging;
pub mod record;
pub mod report;
pub mod summary;
pub mod timestamp;
