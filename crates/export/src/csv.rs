// CSV generation for report/admin exports
//
// Output is UTF-8 with a leading BOM so spreadsheet apps detect the encoding
// of non-ASCII post text. Rows are joined with '\n' and there is no trailing
// newline.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;

/// UTF-8 byte-order mark, written as the first character of every export.
pub const BOM: char = '\u{FEFF}';

/// A single projected cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CsvValue {
    /// Render the unescaped cell text.
    ///
    /// Numbers use the shortest form that round-trips (`12`, `1.5`).
    /// Non-finite numbers have no spreadsheet representation and render empty.
    pub fn render(&self) -> String {
        match self {
            CsvValue::Text(s) => s.clone(),
            CsvValue::Number(n) if !n.is_finite() => String::new(),
            // Avoid "-0"
            CsvValue::Number(n) if *n == 0.0 => "0".to_string(),
            CsvValue::Number(n) => n.to_string(),
            CsvValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CsvValue {
    fn from(s: &str) -> Self {
        CsvValue::Text(s.to_string())
    }
}

impl From<String> for CsvValue {
    fn from(s: String) -> Self {
        CsvValue::Text(s)
    }
}

impl From<&String> for CsvValue {
    fn from(s: &String) -> Self {
        CsvValue::Text(s.clone())
    }
}

impl From<f64> for CsvValue {
    fn from(n: f64) -> Self {
        CsvValue::Number(n)
    }
}

impl From<i64> for CsvValue {
    fn from(n: i64) -> Self {
        CsvValue::Number(n as f64)
    }
}

impl From<u32> for CsvValue {
    fn from(n: u32) -> Self {
        CsvValue::Number(f64::from(n))
    }
}

impl<T: Into<CsvValue>> From<Option<T>> for CsvValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CsvValue::Empty, Into::into)
    }
}

/// Header label plus projection from a row to one cell.
pub struct CsvColumn<'a, T> {
    pub header: String,
    accessor: Box<dyn Fn(&T) -> CsvValue + 'a>,
}

impl<'a, T> CsvColumn<'a, T> {
    pub fn new<V, F>(header: impl Into<String>, accessor: F) -> Self
    where
        V: Into<CsvValue>,
        F: Fn(&T) -> V + 'a,
    {
        Self {
            header: header.into(),
            accessor: Box::new(move |row: &T| -> CsvValue { accessor(row).into() }),
        }
    }

    pub fn value(&self, row: &T) -> CsvValue {
        (self.accessor)(row)
    }
}

impl<T> std::fmt::Debug for CsvColumn<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvColumn").field("header", &self.header).finish()
    }
}

/// Serialize `rows` through `columns` into BOM-prefixed CSV text.
///
/// Fields containing a comma, quote, CR or LF are quoted with inner quotes
/// doubled. The header row is always present, so zero rows yields
/// `BOM + header`.
pub fn generate_csv_content<T>(rows: &[T], columns: &[CsvColumn<'_, T>]) -> Result<String, ExportError> {
    if columns.is_empty() {
        // No fields at all: one empty line per row after an empty header
        return Ok(format!("{BOM}{}", "\n".repeat(rows.len())));
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.header.as_str()))?;

    for row in rows {
        writer.write_record(columns.iter().map(|c| c.value(row).render()))?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))?;

    // Rows are joined, not terminated
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }

    let body = String::from_utf8(bytes).map_err(|e| ExportError::Csv(e.to_string()))?;

    let mut content = String::with_capacity(body.len() + BOM.len_utf8());
    content.push(BOM);
    content.push_str(&body);
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Post {
        id: u32,
        text: String,
        views: i64,
        engagement: Option<f64>,
    }

    fn post(id: u32, text: &str, views: i64, engagement: Option<f64>) -> Post {
        Post {
            id,
            text: text.to_string(),
            views,
            engagement,
        }
    }

    fn columns<'a>() -> Vec<CsvColumn<'a, Post>> {
        vec![
            CsvColumn::new("ID", |p: &Post| p.id),
            CsvColumn::new("Text", |p: &Post| p.text.clone()),
            CsvColumn::new("Views", |p: &Post| p.views),
            CsvColumn::new("Engagement", |p: &Post| p.engagement),
        ]
    }

    fn strip_bom(s: &str) -> &str {
        s.strip_prefix(BOM).expect("output must start with BOM")
    }

    #[test]
    fn header_only_for_zero_rows() {
        let out = generate_csv_content(&[], &columns()).unwrap();
        assert_eq!(out, "\u{FEFF}ID,Text,Views,Engagement");
    }

    #[test]
    fn basic_rows() {
        let rows = vec![
            post(1, "hello", 120, Some(4.5)),
            post(2, "world", 0, None),
        ];
        let out = generate_csv_content(&rows, &columns()).unwrap();
        assert_eq!(
            strip_bom(&out),
            "ID,Text,Views,Engagement\n1,hello,120,4.5\n2,world,0,"
        );
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn escapes_comma_and_quote() {
        let rows = vec![post(1, "a,b\"c", 1, None)];
        let out = generate_csv_content(&rows, &columns()).unwrap();
        assert!(out.contains("\"a,b\"\"c\""));
    }

    #[test]
    fn escapes_newlines() {
        let rows = vec![post(1, "line one\nline two", 1, None), post(2, "cr\rhere", 1, None)];
        let out = generate_csv_content(&rows, &columns()).unwrap();
        assert!(out.contains("\"line one\nline two\""));
        assert!(out.contains("\"cr\rhere\""));
    }

    #[test]
    fn plain_values_are_not_quoted() {
        let rows = vec![post(7, "just text with spaces", 3, Some(0.25))];
        let out = generate_csv_content(&rows, &columns()).unwrap();
        assert!(strip_bom(&out).ends_with("7,just text with spaces,3,0.25"));
    }

    #[test]
    fn round_trips_through_csv_reader() {
        let tricky = "a,b\"c";
        let rows = vec![post(1, tricky, 5, None), post(2, "日本語 ✓", 6, Some(1.0))];
        let out = generate_csv_content(&rows, &columns()).unwrap();

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(strip_bom(&out).as_bytes());
        let records: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], tricky);
        assert_eq!(&records[1][1], "日本語 ✓");
        assert_eq!(&records[1][3], "1");
    }

    #[test]
    fn capturing_accessor() {
        let suffix = String::from("!");
        let cols = vec![CsvColumn::new("Shout", |p: &Post| format!("{}{}", p.text, suffix))];
        let out = generate_csv_content(&[post(1, "hi", 0, None)], &cols).unwrap();
        assert_eq!(strip_bom(&out), "Shout\nhi!");
    }

    #[test]
    fn no_columns() {
        let cols: Vec<CsvColumn<'_, Post>> = Vec::new();
        let out = generate_csv_content(&[post(1, "x", 0, None), post(2, "y", 0, None)], &cols).unwrap();
        assert_eq!(out, "\u{FEFF}\n\n");
    }

    #[test]
    fn value_rendering() {
        assert_eq!(CsvValue::from(12.0).render(), "12");
        assert_eq!(CsvValue::from(1.5).render(), "1.5");
        assert_eq!(CsvValue::from(-0.0).render(), "0");
        assert_eq!(CsvValue::from(f64::NAN).render(), "");
        assert_eq!(CsvValue::from(None::<f64>).render(), "");
        assert_eq!(CsvValue::from(Some("x")).render(), "x");
    }
}
