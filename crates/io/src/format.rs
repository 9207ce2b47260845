use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rollcall_recon::ReconError;

/// Table formats a roster can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    Csv,
    Xls,
    Xlsx,
}

impl TableFormat {
    /// Infer from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ReconError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ReconError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    /// Declared format wins; otherwise infer from the path.
    pub fn resolve(path: &Path, declared: Option<&str>) -> Result<Self, ReconError> {
        match declared {
            Some(name) => name.parse(),
            None => Self::from_path(path),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
        }
    }
}

impl FromStr for TableFormat {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xls" => Ok(Self::Xls),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(ReconError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
