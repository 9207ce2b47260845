use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Declared or inferred table format is not CSV, XLS or XLSX.
    UnsupportedFormat(String),
    /// A configured column does not exist in the roster's schema.
    UnknownColumn { roster: String, column: String },
    /// Grouping column required by the group-membership projection is absent.
    MissingColumn { column: String },
    /// Optional reference table source is absent.
    NotFound(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, bad path, etc.).
    ConfigValidation(String),
    /// Malformed table content.
    Parse { source: String, message: String },
    /// IO error (file read, write, etc.).
    Io(String),
}

impl ReconError {
    /// True for conditions the pipeline reports and continues past.
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(format) => {
                write!(f, "unsupported table format: '{format}' (expected csv, xls or xlsx)")
            }
            Self::UnknownColumn { roster, column } => {
                write!(f, "roster '{roster}': unknown column '{column}'")
            }
            Self::MissingColumn { column } => {
                write!(f, "group column '{column}' is missing from the roster")
            }
            Self::NotFound(source) => write!(f, "reference table not found: {source}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Parse { source, message } => write!(f, "cannot parse {source}: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<std::io::Error> for ReconError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
