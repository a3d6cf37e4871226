// Saving generated CSV to disk (the native counterpart of a browser download)

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::ExportError;

/// Append `.csv` unless the caller already did.
pub fn csv_filename(name: &str) -> String {
    if name.ends_with(".csv") {
        name.to_string()
    } else {
        format!("{name}.csv")
    }
}

/// Default save location: the user's download directory, else the current one.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Save CSV content to the user's download directory.
pub fn download_csv(content: &str, filename: &str) -> Result<PathBuf, ExportError> {
    save_csv_to(&default_download_dir(), content, filename)
}

/// Save CSV content as `dir/filename(.csv)` and return the written path.
///
/// Only the final component of `filename` is used, so a name can never
/// escape `dir`.
pub fn save_csv_to(dir: &Path, content: &str, filename: &str) -> Result<PathBuf, ExportError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ExportError::InvalidFilename(filename.to_string()))?;

    fs::create_dir_all(dir)?;

    let path = dir.join(csv_filename(name));
    fs::write(&path, content)?;

    info!("saved {} bytes to {}", content.len(), path.display());
    Ok(path)
}
