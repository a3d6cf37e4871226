use std::collections::{BTreeMap, BTreeSet};

use crate::model::{DiffRecord, DiffSummary};

/// Compute summary statistics from drift records.
pub fn summarize(diffs: &[DiffRecord]) -> DiffSummary {
    let mut field_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    let mut max_abs: Option<f64> = None;

    for d in diffs {
        *field_counts.entry(d.field.clone()).or_insert(0) += 1;
        ids.insert(&d.id);
        let abs = d.diff_percent.abs();
        max_abs = Some(max_abs.map_or(abs, |m| m.max(abs)));
    }

    DiffSummary {
        total_diffs: diffs.len(),
        ids_with_diffs: ids.len(),
        field_counts,
        max_abs_diff_percent: max_abs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(id: &str, field: &str, pct: f64) -> DiffRecord {
        DiffRecord {
            id: id.into(),
            field: field.into(),
            existing: 100.0,
            calculated: 100.0 + pct,
            diff: pct,
            diff_percent: pct,
        }
    }

    #[test]
    fn summary_counts() {
        let diffs = vec![
            diff("p1", "views", 12.0),
            diff("p1", "likes", -30.5),
            diff("p2", "views", 7.0),
        ];
        let summary = summarize(&diffs);
        assert_eq!(summary.total_diffs, 3);
        assert_eq!(summary.ids_with_diffs, 2);
        assert_eq!(summary.field_counts["views"], 2);
        assert_eq!(summary.field_counts["likes"], 1);
        assert_eq!(summary.max_abs_diff_percent, Some(30.5));
    }

    #[test]
    fn empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, DiffSummary::default());
    }
}
