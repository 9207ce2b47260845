//! Roster file I/O: CSV and Excel loading, CSV export, reference tables.

pub mod csv;
pub mod format;
pub mod header;
pub mod reference;
pub mod xlsx;

use std::path::Path;

use rollcall_recon::model::Roster;
use rollcall_recon::ReconError;

pub use format::TableFormat;
pub use reference::FileReference;

/// Turn an uploaded byte stream plus its declared format into a roster.
pub fn load_roster(label: &str, bytes: &[u8], format: TableFormat) -> Result<Roster, ReconError> {
    match format {
        TableFormat::Csv => csv::import(label, bytes),
        TableFormat::Xls | TableFormat::Xlsx => xlsx::import(label, bytes, format),
    }
}

/// Load a roster from disk. `declared` overrides the extension-based format.
pub fn load_roster_path(
    label: &str,
    path: &Path,
    declared: Option<&str>,
) -> Result<Roster, ReconError> {
    let format = TableFormat::resolve(path, declared)?;
    let bytes = std::fs::read(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    let roster = load_roster(label, &bytes, format)?;
    log::info!(
        "loaded {label} roster from {} ({format}): {} rows, {} columns",
        path.display(),
        roster.len(),
        roster.columns().len()
    );
    Ok(roster)
}

/// Serialize a roster as CSV bytes for download.
pub fn write_csv(roster: &Roster) -> Result<Vec<u8>, ReconError> {
    csv::export(roster)
}

pub fn write_csv_path(roster: &Roster, path: &Path) -> Result<(), ReconError> {
    csv::export_path(roster, path)
}
