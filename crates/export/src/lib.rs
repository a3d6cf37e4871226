// Export: CSV generation, saving, and display formatting

pub mod csv;
pub mod download;
pub mod error;
pub mod format;

pub use crate::csv::{generate_csv_content, CsvColumn, CsvValue, BOM};
pub use download::{csv_filename, download_csv, save_csv_to};
pub use error::ExportError;
pub use format::{format_date, format_percent, format_time, truncate_text};
