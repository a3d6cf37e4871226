//! `postlyzer-rollup`: rollup reconciliation engine.
//!
//! Pure crate: receives pre-loaded metric records, returns drift reports.
//! The only IO is CSV parsing from in-memory strings.

pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod latest;
pub mod model;
pub mod score;
pub mod summary;

pub use config::ReconcileConfig;
pub use diff::{compare_diffs, compare_diffs_with_threshold, DIFF_THRESHOLD_PERCENT};
pub use engine::run;
pub use error::RollupError;
pub use latest::{latest_by_key, parse_timestamp};
pub use model::{DiffRecord, MetricRecord, Metrics, ReconcileResult, Timestamped};
pub use score::{score_against_average, PerformanceScore, Tier};
