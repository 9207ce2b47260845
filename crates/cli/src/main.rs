// rollcall CLI - reconcile a student roster against a platform's access list

mod exit_codes;
mod inspect;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use rollcall_recon::ReconError;
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Reconcile a student roster against a platform access list")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation and write the change files
    #[command(after_help = "\
Examples:
  rollcall run autumn.toml
  rollcall run autumn.toml --out-dir uploads/
  rollcall run autumn.toml --json
  rollcall run autumn.toml --check")]
    Run {
        /// Path to the reconciliation TOML config
        config: PathBuf,

        /// Directory for output files (default: the config file's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write nothing; exit 7 if any access would change
        #[arg(long)]
        check: bool,
    },

    /// Load both rosters and check every configured column
    #[command(after_help = "\
Examples:
  rollcall validate autumn.toml")]
    Validate {
        /// Path to the reconciliation TOML config
        config: PathBuf,
    },

    /// List a roster's column names
    #[command(after_help = "\
Examples:
  rollcall columns active.xlsx
  rollcall columns export.txt --format csv")]
    Columns {
        /// Roster file (csv, xls or xlsx)
        file: PathBuf,

        /// Override the format inferred from the extension
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// List the distinct values of one column, in order of first appearance
    #[command(after_help = "\
Examples:
  rollcall values active.xlsx --column Campus
  rollcall values active.xlsx --column \"Study Path\" --json")]
    Values {
        /// Roster file (csv, xls or xlsx)
        file: PathBuf,

        /// Column to list
        #[arg(long, short = 'c')]
        column: String,

        /// Override the format inferred from the extension
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Print as a JSON array of typed values
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  rollcall-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Install the stderr subscriber. Library crates log through `log`; the
/// subscriber's log bridge picks those records up.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, out_dir, json, check } => recon::cmd_run(config, out_dir, json, check),
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Columns { file, format, json } => inspect::cmd_columns(file, format, json),
        Commands::Values { file, column, format, json } => {
            inspect::cmd_values(file, column, format, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::UnknownColumn { .. } | ReconError::MissingColumn { .. } => {
                Some("run `rollcall columns <file>` to list a roster's columns".to_string())
            }
            ReconError::UnsupportedFormat(_) => {
                Some("set `format = \"csv\"`, \"xls\" or \"xlsx\" for the roster".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
