//! `postlyzer reconcile` - config-driven rollup reconciliation.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use log::info;

use postlyzer_config::Settings;
use postlyzer_export::{format_percent, generate_csv_content, CsvColumn};
use postlyzer_rollup::engine::load_csv_records;
use postlyzer_rollup::{DiffRecord, MetricRecord, ReconcileConfig, ReconcileResult, RollupError};

use crate::exit_codes::{EXIT_ERROR, EXIT_RECONCILE_DRIFT};
use crate::output::{read_input, save_export};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconcileCommands {
    /// Run a reconciliation job from a TOML file
    #[command(after_help = "\
Examples:
  postlyzer reconcile run posts.reconcile.toml
  postlyzer reconcile run posts.reconcile.toml --json
  postlyzer reconcile run posts.reconcile.toml --threshold 1.5
  postlyzer reconcile run posts.reconcile.toml --csv post-drift --out-dir reports/")]
    Run {
        /// Path to the .reconcile.toml job file
        config: PathBuf,

        /// Output JSON to stdout instead of the drift listing
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the job's threshold_percent
        #[arg(long)]
        threshold: Option<f64>,

        /// Save the drifted fields as CSV under this name
        #[arg(long)]
        csv: Option<String>,

        /// Directory for --csv (defaults to export.directory, then Downloads)
        #[arg(long, requires = "csv")]
        out_dir: Option<PathBuf>,
    },

    /// Validate a reconciliation job without running it
    #[command(after_help = "\
Examples:
  postlyzer reconcile validate posts.reconcile.toml")]
    Validate {
        /// Path to the .reconcile.toml job file
        config: PathBuf,
    },
}

pub fn cmd_reconcile(cmd: ReconcileCommands, settings: &Settings) -> Result<(), CliError> {
    if !settings.features.reconciliation {
        return Err(CliError::disabled("reconciliation"));
    }
    match cmd {
        ReconcileCommands::Run { config, json, output, threshold, csv, out_dir } => {
            cmd_reconcile_run(settings, config, json, output, threshold, csv, out_dir)
        }
        ReconcileCommands::Validate { config } => cmd_reconcile_validate(settings, config),
    }
}

fn rollup_err(err: RollupError) -> CliError {
    match err {
        RollupError::ConfigParse(_) | RollupError::ConfigValidation(_) => CliError::config(err.to_string()),
        _ => CliError::input(err.to_string()),
    }
}

fn load_config(config_path: &Path) -> Result<ReconcileConfig, CliError> {
    let config_str = read_input(config_path)?;
    ReconcileConfig::from_toml(&config_str).map_err(rollup_err)
}

/// Read one side's CSV, resolved relative to the job file's directory.
fn load_side(
    config: &ReconcileConfig,
    base_dir: &Path,
    side: &str,
    file: &str,
) -> Result<Vec<MetricRecord>, CliError> {
    let csv_path = base_dir.join(file);
    let csv_data = read_input(&csv_path)?;
    load_csv_records(
        side,
        &csv_data,
        &config.columns.id,
        config.columns.bucket_ts.as_deref(),
        &config.fields,
    )
    .map_err(rollup_err)
}

fn cmd_reconcile_run(
    settings: &Settings,
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    threshold: Option<f64>,
    csv_name: Option<String>,
    out_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut config = load_config(&config_path)?;
    if threshold.is_some() {
        config.threshold_percent = threshold;
    }
    let config = config.with_default_threshold(settings.default_threshold);

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let existing = load_side(&config, base_dir, "existing", &config.existing)?;
    let calculated = load_side(&config, base_dir, "calculated", &config.calculated)?;

    let result = postlyzer_rollup::run(&config, &existing, &calculated).map_err(rollup_err)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::args(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    } else {
        print_drift(&result);
    }

    if let Some(name) = csv_name {
        let content = drift_csv(&result.diffs)?;
        save_export(settings, out_dir, &content, &name)?;
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} compared, {} drifted field(s) across {} id(s), {} existing-only, {} calculated-only",
        result.meta.config_name,
        s.compared_ids,
        s.diffs.total_diffs,
        s.diffs.ids_with_diffs,
        s.existing_only.len(),
        s.calculated_only.len(),
    );

    if !s.is_clean() {
        return Err(CliError::new(EXIT_RECONCILE_DRIFT, ""));
    }
    Ok(())
}

fn print_drift(result: &ReconcileResult) {
    for d in &result.diffs {
        println!(
            "{}\t{}\t{} -> {}\t{:+}\t{}",
            d.id,
            d.field,
            d.existing,
            d.calculated,
            d.diff,
            format_percent(Some(d.diff_percent)),
        );
    }
    for id in &result.summary.existing_only {
        println!("{id}\t(existing only)");
    }
    for id in &result.summary.calculated_only {
        println!("{id}\t(calculated only)");
    }
}

/// Drift report as an export-ready CSV.
pub fn drift_csv(diffs: &[DiffRecord]) -> Result<String, CliError> {
    let columns = vec![
        CsvColumn::new("ID", |d: &DiffRecord| d.id.clone()),
        CsvColumn::new("Field", |d: &DiffRecord| d.field.clone()),
        CsvColumn::new("Existing", |d: &DiffRecord| d.existing),
        CsvColumn::new("Calculated", |d: &DiffRecord| d.calculated),
        CsvColumn::new("Diff", |d: &DiffRecord| d.diff),
        CsvColumn::new("Diff %", |d: &DiffRecord| d.diff_percent),
    ];
    generate_csv_content(diffs, &columns).map_err(|e| CliError::export(e.to_string()))
}

fn cmd_reconcile_validate(settings: &Settings, config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?.with_default_threshold(settings.default_threshold);
    info!("validated {}", config_path.display());
    eprintln!(
        "{}: valid ({} field(s), threshold {})",
        config.name,
        config.fields.len(),
        format_percent(Some(config.threshold())),
    );
    Ok(())
}
