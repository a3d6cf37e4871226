// Postlyzer CLI - rollup reconciliation, latest-bucket selection, exports

mod exit_codes;
mod latest;
mod output;
mod reconcile;
mod score;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;

use postlyzer_config::Settings;

use exit_codes::{
    EXIT_ERROR, EXIT_EXPORT_WRITE, EXIT_FEATURE_DISABLED, EXIT_INPUT_CSV, EXIT_INVALID_CONFIG,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "postlyzer")]
#[command(about = "Check post-analytics rollups and export report tables")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (defaults to <config dir>/postlyzer/settings.json)
    #[arg(long = "settings", global = true, env = "POSTLYZER_SETTINGS")]
    settings_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare stored rollups against recomputed ones
    #[command(subcommand)]
    Reconcile(reconcile::ReconcileCommands),

    /// Keep only the latest bucket per key from a rollup CSV
    #[command(after_help = "\
Examples:
  postlyzer latest post_rollups.csv --key post_id
  postlyzer latest hourly.csv --key post_id --ts-column hour --json
  postlyzer latest post_rollups.csv --key post_id --save latest-posts")]
    Latest {
        /// Rollup CSV with a header row
        input: PathBuf,

        /// Column whose value groups rows
        #[arg(long)]
        key: String,

        /// Column holding the bucket timestamp
        #[arg(long, default_value = "bucket_ts")]
        ts_column: String,

        /// Print JSON objects instead of CSV
        #[arg(long, conflicts_with = "save")]
        json: bool,

        /// Save CSV under this name instead of printing it
        #[arg(long)]
        save: Option<String>,

        /// Directory for --save (defaults to export.directory, then Downloads)
        #[arg(long, requires = "save")]
        out_dir: Option<PathBuf>,
    },

    /// Score a post metric against the account average
    #[command(after_help = "\
Examples:
  postlyzer score 150 --average 100
  postlyzer score 95 --history 80,100,120
  postlyzer score 42 --history 40,44 --json")]
    Score {
        /// The post's metric value
        value: f64,

        /// Account average for the same metric
        #[arg(long, conflicts_with = "history")]
        average: Option<f64>,

        /// Metric values of the account's posts; their mean is the average
        #[arg(long, value_delimiter = ',')]
        history: Vec<f64>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective settings
    #[command(after_help = "\
Examples:
  postlyzer settings
  postlyzer settings --path")]
    Settings {
        /// Only print the settings file location
        #[arg(long)]
        path: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  postlyzer-rollup ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings_path = cli.settings_file.clone().unwrap_or_else(Settings::config_path);
    let settings = match &cli.settings_file {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    debug!("settings from {}: {:?}", settings_path.display(), settings);

    let result = match cli.command {
        Commands::Reconcile(cmd) => reconcile::cmd_reconcile(cmd, &settings),
        Commands::Latest { input, key, ts_column, json, save, out_dir } => {
            latest::cmd_latest(&settings, input, key, ts_column, json, save, out_dir)
        }
        Commands::Score { value, average, history, json } => {
            score::cmd_score(&settings, value, average, history, json)
        }
        Commands::Settings { path } => cmd_settings(&settings, &settings_path, path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_settings(settings: &Settings, settings_path: &std::path::Path, path_only: bool) -> Result<(), CliError> {
    if path_only {
        println!("{}", settings_path.display());
        return Ok(());
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT_CSV, msg)
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::new(EXIT_EXPORT_WRITE, msg)
    }

    /// A command gated behind a feature switch that is off.
    pub fn disabled(feature: &str) -> Self {
        Self::new(EXIT_FEATURE_DISABLED, format!("{feature} is disabled"))
            .with_hint(format!("set \"features\": {{ \"{feature}\": true }} in settings.json"))
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
