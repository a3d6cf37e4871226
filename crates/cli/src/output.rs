//! Shared file IO for commands: reading inputs and saving CSV exports.

use std::path::{Path, PathBuf};

use postlyzer_config::Settings;
use postlyzer_export::{download_csv, save_csv_to, BOM};

use crate::CliError;

pub fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::args(format!("cannot read {}: {e}", path.display())))
}

/// Explicit export location: `--out-dir`, then `export.directory`.
/// `None` means the download directory.
pub fn export_dir(settings: &Settings, out_dir: Option<PathBuf>) -> Option<PathBuf> {
    out_dir.or_else(|| settings.export_directory.clone())
}

/// Save generated CSV content, refusing when exports are switched off.
pub fn save_export(
    settings: &Settings,
    out_dir: Option<PathBuf>,
    content: &str,
    name: &str,
) -> Result<PathBuf, CliError> {
    if !settings.features.csv_export {
        return Err(CliError::disabled("csv_export"));
    }
    let saved = match export_dir(settings, out_dir) {
        Some(dir) => save_csv_to(&dir, content, name),
        None => download_csv(content, name),
    };
    let path = saved.map_err(|e| CliError::export(e.to_string()))?;
    eprintln!("wrote {}", path.display());
    Ok(path)
}

/// CSV for a terminal or pipe: no BOM, trailing newline.
pub fn print_csv(content: &str) {
    println!("{}", content.strip_prefix(BOM).unwrap_or(content));
}
