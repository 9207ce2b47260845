use std::path::PathBuf;

use rollcall_recon::model::Roster;
use rollcall_recon::{ReconError, ReferenceSource};

use crate::load_roster_path;

/// Static reference table read from disk on demand.
#[derive(Debug, Clone)]
pub struct FileReference {
    path: PathBuf,
    format: Option<String>,
}

impl FileReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl ReferenceSource for FileReference {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Roster, ReconError> {
        if !self.path.is_file() {
            return Err(ReconError::NotFound(self.describe()));
        }
        load_roster_path("reference", &self.path, self.format.as_deref())
    }
}
