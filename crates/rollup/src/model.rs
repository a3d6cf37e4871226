use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One aggregation bucket: per-post or per-account metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_ts: Option<String>,
    pub fields: BTreeMap<String, f64>,
}

impl MetricRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bucket_ts: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_bucket_ts(mut self, ts: impl Into<String>) -> Self {
        self.bucket_ts = Some(ts.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// Numeric field lookup by name. Absent fields are `None`; the diff
/// utility reads them as zero.
pub trait Metrics {
    fn metric(&self, field: &str) -> Option<f64>;
}

impl Metrics for MetricRecord {
    fn metric(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }
}

impl Metrics for BTreeMap<String, f64> {
    fn metric(&self, field: &str) -> Option<f64> {
        self.get(field).copied()
    }
}

impl Metrics for HashMap<String, f64> {
    fn metric(&self, field: &str) -> Option<f64> {
        self.get(field).copied()
    }
}

impl<M: Metrics + ?Sized> Metrics for &M {
    fn metric(&self, field: &str) -> Option<f64> {
        (**self).metric(field)
    }
}

/// Records that may carry a bucket timestamp.
pub trait Timestamped {
    fn bucket_ts(&self) -> Option<&str>;
}

impl Timestamped for MetricRecord {
    fn bucket_ts(&self) -> Option<&str> {
        self.bucket_ts.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A field whose recalculated value drifted past the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub id: String,
    pub field: String,
    pub existing: f64,
    pub calculated: f64,
    pub diff: f64,
    pub diff_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffSummary {
    pub total_diffs: usize,
    pub ids_with_diffs: usize,
    pub field_counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_abs_diff_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileSummary {
    pub existing_ids: usize,
    pub calculated_ids: usize,
    pub compared_ids: usize,
    pub existing_only: Vec<String>,
    pub calculated_only: Vec<String>,
    pub diffs: DiffSummary,
}

impl ReconcileSummary {
    /// True when nothing drifted and both sides cover the same ids.
    pub fn is_clean(&self) -> bool {
        self.diffs.total_diffs == 0
            && self.existing_only.is_empty()
            && self.calculated_only.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileMeta {
    pub config_name: String,
    pub threshold_percent: f64,
    pub fields: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResult {
    pub meta: ReconcileMeta,
    pub summary: ReconcileSummary,
    pub diffs: Vec<DiffRecord>,
}
