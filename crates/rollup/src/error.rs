use std::fmt;

#[derive(Debug)]
pub enum RollupError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no fields, bad threshold, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { side: String, column: String },
    /// Metric cell is not a number.
    ValueParse { side: String, id: String, field: String, value: String },
    /// CSV read error.
    Csv(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for RollupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { side, column } => {
                write!(f, "{side}: missing column '{column}'")
            }
            Self::ValueParse { side, id, field, value } => {
                write!(f, "{side}, record '{id}': cannot parse {field} value '{value}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for RollupError {}

impl From<csv::Error> for RollupError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
