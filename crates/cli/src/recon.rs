//! `rollcall run` / `rollcall validate` — config-driven roster reconciliation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rollcall_io::{load_roster_path, write_csv_path, FileReference};
use rollcall_recon::engine::resolve_columns;
use rollcall_recon::model::{ReconOutcome, Roster};
use rollcall_recon::{ReconConfig, ReconInput, ReferenceSource};
use serde::Serialize;

use crate::exit_codes::{EXIT_CHANGES_PENDING, EXIT_CONFIG, EXIT_USAGE};
use crate::CliError;

/// `--json` report: the outcome plus the files that were written.
#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    outcome: &'a ReconOutcome,
    outputs: Vec<String>,
}

/// Everything a run needs, loaded relative to the config file.
struct Loaded {
    config: ReconConfig,
    base_dir: PathBuf,
    input: ReconInput,
}

fn load_config(config_path: &Path) -> Result<(ReconConfig, PathBuf), CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {e}", config_path.display()),
        hint: None,
    })?;
    let config = ReconConfig::from_toml(&config_str).map_err(CliError::recon)?;

    // Paths in the config are relative to the config file's directory
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    log::info!("config '{}' loaded from {}", config.name, config_path.display());
    Ok((config, base_dir))
}

fn load(config_path: &Path) -> Result<Loaded, CliError> {
    let (config, base_dir) = load_config(config_path)?;

    let active = load_roster_path(
        "active",
        &base_dir.join(&config.active.file),
        config.active.format.as_deref(),
    )
    .map_err(CliError::recon)?;
    let access = load_roster_path(
        "access",
        &base_dir.join(&config.access.file),
        config.access.format.as_deref(),
    )
    .map_err(CliError::recon)?;

    Ok(Loaded { config, base_dir, input: ReconInput { active, access } })
}

pub fn cmd_run(
    config_path: PathBuf,
    out_dir: Option<PathBuf>,
    json_output: bool,
    check: bool,
) -> Result<(), CliError> {
    let Loaded { config, base_dir, input } = load(&config_path)?;

    let reference = config.groups.reference.as_ref().map(|file| {
        let source = FileReference::new(base_dir.join(file));
        match &config.groups.format {
            Some(format) => source.with_format(format.clone()),
            None => source,
        }
    });

    let outcome = rollcall_recon::run(
        &config.request(),
        &input,
        reference.as_ref().map(|r| r as &dyn ReferenceSource),
    )
    .map_err(CliError::recon)?;

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }

    // --check reports without writing anything
    let outputs = if check {
        Vec::new()
    } else {
        let dir = out_dir.unwrap_or_else(|| base_dir.clone());
        let inputs = input_paths(&config, &base_dir);
        write_outputs(&config, &outcome, &dir, &inputs)?
    };

    if json_output {
        let report = RunReport {
            outcome: &outcome,
            outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &outcome.summary;
    eprintln!(
        "{}: {} active ({} after filtering), {} with access: {} to add, {} to remove",
        outcome.meta.config_name,
        s.active_rows,
        s.filtered_rows,
        s.access_rows,
        s.to_add,
        s.to_remove,
    );
    for path in &outputs {
        eprintln!("wrote {}", path.display());
    }

    if check && s.has_changes() {
        return Err(CliError {
            code: EXIT_CHANGES_PENDING,
            message: format!("{} to add, {} to remove", s.to_add, s.to_remove),
            hint: Some("run without --check to write the change files".to_string()),
        });
    }

    Ok(())
}

/// Every file the run reads, resolved against the config directory.
fn input_paths(config: &ReconConfig, base_dir: &Path) -> Vec<PathBuf> {
    [Some(&config.active.file), Some(&config.access.file), config.groups.reference.as_ref()]
        .into_iter()
        .flatten()
        .map(|file| base_dir.join(file))
        .collect()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// `dir/.name.partial`, next to the final file so the rename stays on one filesystem.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        let _ = std::fs::remove_file(partial);
    }
}

/// Write the change files as a set: all of them are staged before any is
/// moved into place, so a failed write leaves the previous outputs intact.
fn write_outputs(
    config: &ReconConfig,
    outcome: &ReconOutcome,
    dir: &Path,
    inputs: &[PathBuf],
) -> Result<Vec<PathBuf>, CliError> {
    let p = &outcome.projections;
    let mut files: Vec<(&str, &Roster)> = vec![
        (config.output.to_add.as_str(), &p.to_add),
        (config.output.group_members.as_str(), &p.group_members),
        (config.output.to_remove.as_str(), &p.to_remove),
    ];
    if let Some(groups) = &p.groups {
        files.push((config.output.groups.as_str(), groups));
    }

    for (name, _) in &files {
        let path = dir.join(name);
        if inputs.iter().any(|input| same_file(input, &path)) {
            return Err(CliError {
                code: EXIT_USAGE,
                message: format!("output {} would overwrite an input file", path.display()),
                hint: Some("choose another --out-dir or rename the file under [output]".into()),
            });
        }
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
    for (name, roster) in files {
        let path = dir.join(name);
        let partial = partial_path(&path);
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                discard(&staged);
                return Err(CliError::io(format!("cannot create {}: {e}", parent.display())));
            }
        }
        log::debug!("writing {} rows to {}", roster.len(), partial.display());
        if let Err(e) = write_csv_path(roster, &partial) {
            discard(&staged);
            let _ = std::fs::remove_file(&partial);
            return Err(CliError::recon(e));
        }
        staged.push((partial, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (i, (partial, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(partial, path) {
            discard(&staged[i..]);
            return Err(CliError::io(format!("cannot write {}: {e}", path.display())));
        }
        written.push(path.clone());
    }
    Ok(written)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let Loaded { config, base_dir, input } = load(&config_path)?;

    resolve_columns(&config.selection(), &input.active, &input.access)
        .map_err(CliError::recon)?;

    if let Some(file) = &config.groups.reference {
        let path = base_dir.join(file);
        if !path.is_file() {
            eprintln!(
                "warning: reference table {} not found; groups output will be skipped",
                path.display()
            );
        }
    }

    eprintln!(
        "{}: ok ({} active rows, {} access rows)",
        config.name,
        input.active.len(),
        input.access.len(),
    );
    Ok(())
}
