use std::fmt;

#[derive(Debug)]
pub enum ExportError {
    /// CSV writer failure.
    Csv(String),
    /// Filename has no usable final component ("", "..", "/").
    InvalidFilename(String),
    /// IO error (create dir, write file).
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::InvalidFilename(name) => write!(f, "invalid export filename: {name:?}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<::csv::Error> for ExportError {
    fn from(e: ::csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
