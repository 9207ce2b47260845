//! `rollcall columns` / `rollcall values` — look inside a roster before
//! writing a config for it.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rollcall_io::load_roster_path;
use rollcall_recon::distinct_values;
use rollcall_recon::model::Roster;

use crate::CliError;

fn load(file: &Path, format: Option<&str>) -> Result<Roster, CliError> {
    load_roster_path("input", file, format).map_err(CliError::recon)
}

pub fn cmd_columns(file: PathBuf, format: Option<String>, json: bool) -> Result<(), CliError> {
    let roster = load(&file, format.as_deref())?;

    if json {
        let json_str = serde_json::to_string(roster.columns())
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for name in roster.columns() {
        writeln!(handle, "{name}").map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

pub fn cmd_values(
    file: PathBuf,
    column: String,
    format: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let roster = load(&file, format.as_deref())?;
    let col = roster.column(&column).map_err(|e| {
        CliError::recon(e).with_hint(format!(
            "available columns: {}",
            roster.columns().join(", ")
        ))
    })?;
    let values = distinct_values(&roster, &col);

    if json {
        // Typed scalars, ready to paste into a filter list
        let json_str = serde_json::to_string(&values)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for value in &values {
        let line = if value.is_missing() {
            "(blank)".to_string()
        } else {
            value.to_string()
        };
        writeln!(handle, "{line}").map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}
