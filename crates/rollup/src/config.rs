use std::collections::HashSet;

use serde::Deserialize;

use crate::diff::DIFF_THRESHOLD_PERCENT;
use crate::error::RollupError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A reconciliation job: which two rollup tables to compare and how.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    pub name: String,
    /// Stored (incrementally maintained) rollup table.
    pub existing: String,
    /// Freshly recomputed rollup table.
    pub calculated: String,
    pub columns: ColumnMapping,
    pub fields: Vec<String>,
    /// Unset means "use the caller's default" (see [`ReconcileConfig::threshold`]).
    #[serde(default)]
    pub threshold_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub id: String,
    #[serde(default)]
    pub bucket_ts: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconcileConfig {
    pub fn from_toml(input: &str) -> Result<Self, RollupError> {
        let config: ReconcileConfig =
            toml::from_str(input).map_err(|e| RollupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Effective drift threshold in percent.
    pub fn threshold(&self) -> f64 {
        self.threshold_percent.unwrap_or(DIFF_THRESHOLD_PERCENT)
    }

    /// Fill in the threshold when the job file leaves it unset.
    pub fn with_default_threshold(mut self, threshold_percent: f64) -> Self {
        self.threshold_percent.get_or_insert(threshold_percent);
        self
    }

    pub fn validate(&self) -> Result<(), RollupError> {
        if self.fields.is_empty() {
            return Err(RollupError::ConfigValidation(
                "at least one field is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.trim().is_empty() {
                return Err(RollupError::ConfigValidation("field names must not be empty".into()));
            }
            if !seen.insert(field.as_str()) {
                return Err(RollupError::ConfigValidation(format!(
                    "field '{field}' listed more than once"
                )));
            }
            if *field == self.columns.id || self.columns.bucket_ts.as_deref() == Some(field.as_str()) {
                return Err(RollupError::ConfigValidation(format!(
                    "field '{field}' is also a key column"
                )));
            }
        }

        let threshold = self.threshold();
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(RollupError::ConfigValidation(format!(
                "threshold_percent must be a non-negative number, got {threshold}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Post rollups"
existing = "post_rollups.csv"
calculated = "post_rollups_recomputed.csv"
fields = ["views", "likes", "replies"]

[columns]
id = "post_id"
bucket_ts = "bucket_ts"
"#;

    #[test]
    fn parse_valid() {
        let config = ReconcileConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Post rollups");
        assert_eq!(config.fields, vec!["views", "likes", "replies"]);
        assert_eq!(config.columns.id, "post_id");
        assert_eq!(config.columns.bucket_ts.as_deref(), Some("bucket_ts"));
        assert_eq!(config.threshold_percent, None);
        assert_eq!(config.threshold(), 5.0);
    }

    #[test]
    fn parse_custom_threshold() {
        let input = VALID.replace("fields =", "threshold_percent = 2.5\nfields =");
        let config = ReconcileConfig::from_toml(&input).unwrap();
        assert_eq!(config.threshold(), 2.5);
        // An explicit value beats the caller's default
        assert_eq!(config.with_default_threshold(9.0).threshold(), 2.5);
    }

    #[test]
    fn default_threshold_fills_unset() {
        let config = ReconcileConfig::from_toml(VALID).unwrap().with_default_threshold(1.0);
        assert_eq!(config.threshold(), 1.0);
    }

    #[test]
    fn bucket_column_is_optional() {
        let input = VALID.replace("bucket_ts = \"bucket_ts\"\n", "");
        let config = ReconcileConfig::from_toml(&input).unwrap();
        assert!(config.columns.bucket_ts.is_none());
    }

    #[test]
    fn reject_empty_fields() {
        let input = VALID.replace(r#"["views", "likes", "replies"]"#, "[]");
        let err = ReconcileConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("at least one field"));
    }

    #[test]
    fn reject_duplicate_field() {
        let input = VALID.replace(r#""replies""#, r#""views""#);
        let err = ReconcileConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("'views'"));
    }

    #[test]
    fn reject_key_column_as_field() {
        let input = VALID.replace(r#""replies""#, r#""post_id""#);
        let err = ReconcileConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("key column"));
    }

    #[test]
    fn reject_negative_threshold() {
        let input = VALID.replace("fields =", "threshold_percent = -1.0\nfields =");
        let err = ReconcileConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("threshold_percent"));
    }

    #[test]
    fn reject_missing_columns_table() {
        let input = r#"
name = "Bad"
existing = "a.csv"
calculated = "b.csv"
fields = ["views"]
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, RollupError::ConfigParse(_)));
    }
}
