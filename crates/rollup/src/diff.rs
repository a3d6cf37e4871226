// Field-by-field drift check between a stored rollup and a recomputed one.
// Pure functions: two records in, drifted fields out.

use log::trace;

use crate::model::{DiffRecord, Metrics};

/// Relative deviation (in percent) a field must exceed to be reported.
pub const DIFF_THRESHOLD_PERCENT: f64 = 5.0;

/// Compare `existing` against `calculated` for each field in `fields` and
/// return the fields whose relative deviation exceeds 5%.
///
/// Output follows the order of `fields`. A field absent from either record
/// reads as `0`.
pub fn compare_diffs<E, C>(id: &str, existing: &E, calculated: &C, fields: &[&str]) -> Vec<DiffRecord>
where
    E: Metrics + ?Sized,
    C: Metrics + ?Sized,
{
    compare_diffs_with_threshold(id, existing, calculated, fields, DIFF_THRESHOLD_PERCENT)
}

/// Same as [`compare_diffs`] with a caller-chosen threshold.
pub fn compare_diffs_with_threshold<E, C, S>(
    id: &str,
    existing: &E,
    calculated: &C,
    fields: &[S],
    threshold_percent: f64,
) -> Vec<DiffRecord>
where
    E: Metrics + ?Sized,
    C: Metrics + ?Sized,
    S: AsRef<str>,
{
    let mut diffs = Vec::new();

    for field in fields {
        let field = field.as_ref();
        let existing_val = existing.metric(field).unwrap_or(0.0);
        let calculated_val = calculated.metric(field).unwrap_or(0.0);

        let diff = calculated_val - existing_val;
        let diff_percent = relative_percent(existing_val, calculated_val);

        if diff_percent.abs() > threshold_percent {
            trace!("{id}.{field}: {existing_val} -> {calculated_val} ({diff_percent:.2}%)");
            diffs.push(DiffRecord {
                id: id.to_string(),
                field: field.to_string(),
                existing: existing_val,
                calculated: calculated_val,
                diff,
                diff_percent: round2(diff_percent),
            });
        }
    }

    diffs
}

/// Percent change from `base` to `value`.
///
/// A non-positive base has no meaningful ratio: any positive value counts as
/// a full 100% change, anything else as no change.
pub fn relative_percent(base: f64, value: f64) -> f64 {
    if base > 0.0 {
        (value - base) / base * 100.0
    } else if value > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Round to 2 decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricRecord;
    use std::collections::HashMap;

    fn rec(pairs: &[(&str, f64)]) -> MetricRecord {
        pairs
            .iter()
            .fold(MetricRecord::new("post_1"), |r, (k, v)| r.with_field(*k, *v))
    }

    #[test]
    fn six_percent_is_reported() {
        let diffs = compare_diffs("post_1", &rec(&[("views", 100.0)]), &rec(&[("views", 106.0)]), &["views"]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].id, "post_1");
        assert_eq!(diffs[0].field, "views");
        assert_eq!(diffs[0].diff, 6.0);
        assert_eq!(diffs[0].diff_percent, 6.0);
    }

    #[test]
    fn four_percent_is_not_reported() {
        let diffs = compare_diffs("post_1", &rec(&[("views", 100.0)]), &rec(&[("views", 104.0)]), &["views"]);
        assert!(diffs.is_empty());
    }

    #[test]
    fn exactly_five_percent_is_not_reported() {
        let diffs = compare_diffs("p", &rec(&[("likes", 200.0)]), &rec(&[("likes", 210.0)]), &["likes"]);
        assert!(diffs.is_empty());
    }

    #[test]
    fn negative_drift_is_reported() {
        let diffs = compare_diffs("p", &rec(&[("likes", 200.0)]), &rec(&[("likes", 150.0)]), &["likes"]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].diff, -50.0);
        assert_eq!(diffs[0].diff_percent, -25.0);
    }

    #[test]
    fn zero_to_zero_is_not_reported() {
        let diffs = compare_diffs("p", &rec(&[("replies", 0.0)]), &rec(&[("replies", 0.0)]), &["replies"]);
        assert!(diffs.is_empty());
    }

    #[test]
    fn zero_to_positive_is_full_change() {
        let diffs = compare_diffs("p", &rec(&[("replies", 0.0)]), &rec(&[("replies", 5.0)]), &["replies"]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].diff, 5.0);
        assert_eq!(diffs[0].diff_percent, 100.0);
    }

    #[test]
    fn positive_to_zero_is_full_drop() {
        let diffs = compare_diffs("p", &rec(&[("reposts", 8.0)]), &rec(&[("reposts", 0.0)]), &["reposts"]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].diff_percent, -100.0);
    }

    #[test]
    fn percent_is_rounded_to_two_places() {
        let diffs = compare_diffs("p", &rec(&[("views", 300.0)]), &rec(&[("views", 320.0)]), &["views"]);
        assert_eq!(diffs[0].diff_percent, 6.67);
    }

    #[test]
    fn empty_field_list_yields_nothing() {
        let fields: [&str; 0] = [];
        let diffs = compare_diffs("p", &rec(&[("views", 1.0)]), &rec(&[("views", 100.0)]), &fields);
        assert!(diffs.is_empty());
    }

    #[test]
    fn missing_field_reads_as_zero() {
        let diffs = compare_diffs("p", &rec(&[]), &rec(&[("quotes", 3.0)]), &["quotes"]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].existing, 0.0);
        assert_eq!(diffs[0].diff_percent, 100.0);
    }

    #[test]
    fn output_follows_field_order() {
        let existing = rec(&[("a", 10.0), ("b", 10.0)]);
        let calculated = rec(&[("a", 20.0), ("b", 30.0)]);
        let ab = compare_diffs("p", &existing, &calculated, &["a", "b"]);
        let ba = compare_diffs("p", &existing, &calculated, &["b", "a"]);
        assert_eq!(ab.iter().map(|d| d.field.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(ba.iter().map(|d| d.field.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn works_over_plain_maps() {
        let existing: HashMap<String, f64> = HashMap::from([("views".to_string(), 50.0)]);
        let calculated: HashMap<String, f64> = HashMap::from([("views".to_string(), 60.0)]);
        let diffs = compare_diffs("acct_9", &existing, &calculated, &["views"]);
        assert_eq!(diffs[0].diff_percent, 20.0);
    }

    #[test]
    fn custom_threshold() {
        let existing = rec(&[("views", 100.0)]);
        let calculated = rec(&[("views", 104.0)]);
        let fields = vec!["views".to_string()];
        assert_eq!(compare_diffs_with_threshold("p", &existing, &calculated, &fields, 1.0).len(), 1);
        assert!(compare_diffs_with_threshold("p", &existing, &calculated, &fields, 10.0).is_empty());
    }

    #[test]
    fn relative_percent_conventions() {
        assert_eq!(relative_percent(100.0, 106.0), 6.0);
        assert_eq!(relative_percent(0.0, 0.0), 0.0);
        assert_eq!(relative_percent(0.0, 7.0), 100.0);
        assert_eq!(relative_percent(-4.0, 2.0), 100.0);
        assert_eq!(relative_percent(-4.0, -2.0), 0.0);
    }
}
