use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::config::ReconcileConfig;
use crate::diff::compare_diffs_with_threshold;
use crate::error::RollupError;
use crate::latest::latest_by_key;
use crate::model::{MetricRecord, ReconcileMeta, ReconcileResult, ReconcileSummary};
use crate::summary::summarize;

/// Reconcile stored rollups against recomputed ones per config.
///
/// Several rows sharing an id on one side collapse to the latest bucket.
/// Ids present on only one side are reported but not diffed.
pub fn run(
    config: &ReconcileConfig,
    existing: &[MetricRecord],
    calculated: &[MetricRecord],
) -> Result<ReconcileResult, RollupError> {
    config.validate()?;
    let threshold = config.threshold();

    let existing_latest = latest_by_key(existing, |r| r.id.clone());
    let calculated_latest = latest_by_key(calculated, |r| r.id.clone());

    let ids: BTreeSet<&String> = existing_latest.keys().chain(calculated_latest.keys()).collect();

    let mut diffs = Vec::new();
    let mut existing_only = Vec::new();
    let mut calculated_only = Vec::new();
    let mut compared = 0;

    for id in ids {
        match (existing_latest.get(id), calculated_latest.get(id)) {
            (Some(e), Some(c)) => {
                compared += 1;
                diffs.extend(compare_diffs_with_threshold(
                    id,
                    e,
                    c,
                    &config.fields,
                    threshold,
                ));
            }
            (Some(_), None) => existing_only.push(id.clone()),
            (None, Some(_)) => calculated_only.push(id.clone()),
            (None, None) => {}
        }
    }

    debug!(
        "reconcile '{}': {} compared, {} existing-only, {} calculated-only",
        config.name,
        compared,
        existing_only.len(),
        calculated_only.len()
    );

    let summary = ReconcileSummary {
        existing_ids: existing_latest.len(),
        calculated_ids: calculated_latest.len(),
        compared_ids: compared,
        existing_only,
        calculated_only,
        diffs: summarize(&diffs),
    };

    info!("reconcile '{}': {} drifted field(s)", config.name, summary.diffs.total_diffs);

    Ok(ReconcileResult {
        meta: ReconcileMeta {
            config_name: config.name.clone(),
            threshold_percent: threshold,
            fields: config.fields.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        diffs,
    })
}

/// Load a headed rollup CSV into [`MetricRecord`]s.
///
/// `side` only labels errors. Empty metric cells read as 0; anything else
/// that is not a number is an error.
pub fn load_csv_records<S: AsRef<str>>(
    side: &str,
    csv_data: &str,
    id_column: &str,
    bucket_ts_column: Option<&str>,
    fields: &[S],
) -> Result<Vec<MetricRecord>, RollupError> {
    // Spreadsheet exports often carry a BOM in front of the first header
    let csv_data = csv_data.strip_prefix('\u{FEFF}').unwrap_or(csv_data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let idx = |name: &str| -> Result<usize, RollupError> {
        headers.iter().position(|h| h == name).ok_or_else(|| RollupError::MissingColumn {
            side: side.into(),
            column: name.into(),
        })
    };

    let id_idx = idx(id_column)?;
    let ts_idx = bucket_ts_column.map(|c| idx(c)).transpose()?;
    let field_idx: Vec<(&str, usize)> = fields
        .iter()
        .map(|f| idx(f.as_ref()).map(|i| (f.as_ref(), i)))
        .collect::<Result<_, _>>()?;

    let mut records = Vec::new();

    for record in reader.records() {
        let record = record?;

        let id = record.get(id_idx).unwrap_or("").to_string();
        let bucket_ts = ts_idx
            .and_then(|i| record.get(i))
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string());

        let mut values = BTreeMap::new();
        for &(field, i) in &field_idx {
            let raw = record.get(i).unwrap_or("").trim();
            let value = if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>().map_err(|_| RollupError::ValueParse {
                    side: side.into(),
                    id: id.clone(),
                    field: field.into(),
                    value: raw.into(),
                })?
            };
            values.insert(field.to_string(), value);
        }

        records.push(MetricRecord {
            id,
            bucket_ts,
            fields: values,
        });
    }

    debug!("{side}: loaded {} records", records.len());
    Ok(records)
}
