//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them, so treat changes as breaking.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, output over an input)     |
//! | 3    | Unsupported roster format                            |
//! | 4    | Configured column not present in a roster            |
//! | 5    | Invalid or unreadable config                         |
//! | 6    | Roster read or parse failure, output write failure   |
//! | 7    | `run --check`: changes are pending                   |

use rollcall_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options (emitted by clap),
/// or an output location that would overwrite an input.
pub const EXIT_USAGE: u8 = 2;

/// Roster format is not csv, xls or xlsx.
pub const EXIT_UNSUPPORTED_FORMAT: u8 = 3;

/// A join, filter or group column is absent from its roster.
pub const EXIT_UNKNOWN_COLUMN: u8 = 4;

/// Config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// Reading a roster or writing an output failed.
pub const EXIT_IO: u8 = 6;

/// `run --check` found rows to add or remove.
pub const EXIT_CHANGES_PENDING: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::UnsupportedFormat(_) => EXIT_UNSUPPORTED_FORMAT,
        ReconError::UnknownColumn { .. } | ReconError::MissingColumn { .. } => EXIT_UNKNOWN_COLUMN,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::Parse { .. } | ReconError::Io(_) | ReconError::NotFound(_) => EXIT_IO,
    }
}
