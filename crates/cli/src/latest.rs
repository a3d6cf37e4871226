//! `postlyzer latest` - keep the newest bucket per key from a rollup dump.

use std::path::PathBuf;

use log::debug;

use postlyzer_config::Settings;
use postlyzer_export::{generate_csv_content, CsvColumn};
use postlyzer_rollup::{latest_by_key, Timestamped};

use crate::exit_codes::EXIT_ERROR;
use crate::output::{print_csv, read_input, save_export};
use crate::CliError;

/// One CSV row, kept whole so every column survives selection.
#[derive(Debug, Clone)]
struct Row {
    key: String,
    ts: Option<String>,
    cells: Vec<String>,
}

impl Timestamped for Row {
    fn bucket_ts(&self) -> Option<&str> {
        self.ts.as_deref()
    }
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

fn column_index(headers: &[String], name: &str) -> Result<usize, CliError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        CliError::args(format!("unknown column: \"{name}\""))
            .with_hint(format!("available columns: {}", headers.join(", ")))
    })
}

fn read_table(data: &str, key: &str, ts_column: &str) -> Result<Table, CliError> {
    let data = data.strip_prefix('\u{FEFF}').unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CliError::input(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let key_idx = column_index(&headers, key)?;
    let ts_idx = column_index(&headers, ts_column)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CliError::input(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(Row {
            key: cells.get(key_idx).cloned().unwrap_or_default(),
            ts: cells.get(ts_idx).filter(|s| !s.trim().is_empty()).cloned(),
            cells,
        });
    }

    Ok(Table { headers, rows })
}

/// Latest row per key, ordered by key.
fn select_latest(table: &Table) -> Vec<Row> {
    let latest = latest_by_key(&table.rows, |r| r.key.clone());
    debug!("latest: {} rows -> {} keys", table.rows.len(), latest.len());
    latest.into_values().collect()
}

fn to_csv(headers: &[String], rows: &[Row]) -> Result<String, CliError> {
    let columns: Vec<CsvColumn<'_, Row>> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| CsvColumn::new(h.clone(), move |r: &Row| r.cells.get(i).cloned().unwrap_or_default()))
        .collect();
    generate_csv_content(rows, &columns).map_err(|e| CliError::export(e.to_string()))
}

fn to_json(headers: &[String], rows: &[Row]) -> serde_json::Value {
    let objects = rows
        .iter()
        .map(|r| {
            let map: serde_json::Map<String, serde_json::Value> = headers
                .iter()
                .zip(&r.cells)
                .map(|(h, c)| (h.clone(), serde_json::Value::String(c.clone())))
                .collect();
            serde_json::Value::Object(map)
        })
        .collect();
    serde_json::Value::Array(objects)
}

pub fn cmd_latest(
    settings: &Settings,
    input: PathBuf,
    key: String,
    ts_column: String,
    json: bool,
    save: Option<String>,
    out_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    if !settings.features.latest_selection {
        return Err(CliError::disabled("latest_selection"));
    }

    let data = read_input(&input)?;
    let table = read_table(&data, &key, &ts_column)?;
    let latest = select_latest(&table);

    if json {
        let out = serde_json::to_string_pretty(&to_json(&table.headers, &latest))
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    let content = to_csv(&table.headers, &latest)?;
    match save {
        Some(name) => {
            save_export(settings, out_dir, &content, &name)?;
        }
        None => print_csv(&content),
    }
    Ok(())
}
