// deptboard CLI - department metrics reports from the terminal

mod diff;
mod exit_codes;
mod export;
mod inspect;
mod merge;
mod snapshots;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use deptboard_report::ReportError;

use exit_codes::{report_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use snapshots::SnapshotCommands;

#[derive(Parser)]
#[command(name = "deptboard")]
#[command(about = "Department metrics reports from spreadsheet exports (headless)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge source exports into one department metrics table
    #[command(after_help = "\
Files are matched to their source system by filename, or by banner text
found inside the sheets. Use a manifest to override classification per
file.

Examples:
  deptboard merge placements.xlsx enrichment.csv --json
  deptboard merge careers_export.csv --output report.json
  deptboard merge --manifest upload.toml --json")]
    Merge {
        /// Upload files (.xlsx, .xls, or .csv), in upload order
        files: Vec<PathBuf>,

        /// Read the upload batch from a TOML manifest instead
        #[arg(long, short = 'm', conflicts_with = "files")]
        manifest: Option<PathBuf>,

        /// Print the merged report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the merged report JSON to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Quiet mode - suppress stderr summaries and warnings
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Render the styled workbook, with period deltas from the snapshot store
    #[command(after_help = "\
With --org and --template, the previous snapshot of the same template is
loaded for the delta columns and the new snapshot is recorded after a
successful render. Without them the export still renders, with every
delta shown as 0.

Examples:
  deptboard export placements.xlsx --name \"Q3 Review\"
  deptboard export --manifest upload.toml --output q3.xlsx
  deptboard export data.csv --org acme --template weekly --store-dir ./store
  deptboard export data.csv --org acme --template weekly --no-save")]
    Export {
        /// Upload files (.xlsx, .xls, or .csv), in upload order
        files: Vec<PathBuf>,

        /// Read the upload batch from a TOML manifest instead
        #[arg(long, short = 'm', conflicts_with = "files")]
        manifest: Option<PathBuf>,

        /// Report name for the title row and suggested filename
        #[arg(long)]
        name: Option<String>,

        /// Free-text line for the metadata block
        #[arg(long)]
        summary: Option<String>,

        /// Organization scope for snapshot history
        #[arg(long)]
        org: Option<String>,

        /// Template key for snapshot history
        #[arg(long)]
        template: Option<String>,

        /// Snapshot store directory
        #[arg(long, env = "DEPTBOARD_STORE_DIR")]
        store_dir: Option<String>,

        /// Output file (default: suggested filename in the working directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Render with history but do not record the new snapshot
        #[arg(long)]
        no_save: bool,

        /// Print a machine-readable receipt to stdout
        #[arg(long)]
        json: bool,

        /// Quiet mode - suppress stderr summaries and warnings
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show per-department deltas between two snapshot JSON files
    #[command(after_help = "\
Only change-eligible metrics get deltas: numeric columns and
percentage-named columns. When PREVIOUS is omitted the first-upload
convention applies and every delta is 0.

Examples:
  deptboard diff current.json previous.json
  deptboard diff current.json previous.json --json
  deptboard diff current.json")]
    Diff {
        /// Current snapshot JSON file
        current: PathBuf,

        /// Previous snapshot JSON file
        previous: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Quiet mode - suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Inspect the on-disk snapshot store
    Snapshots {
        #[command(subcommand)]
        command: SnapshotCommands,
    },

    /// Preview how an upload will be read and classified
    #[command(after_help = "\
Examples:
  deptboard inspect careers_export.csv
  deptboard inspect q3_placements.xlsx --json")]
    Inspect {
        /// Upload file (.xlsx, .xls, or .csv)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Extended version info for `deptboard --version`.
fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\nengine:  deptboard-report ",
            env!("CARGO_PKG_VERSION"),
            "\nsnapshot schema: 1",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\nengine:  deptboard-report ",
            env!("CARGO_PKG_VERSION"),
            "\nsnapshot schema: 1",
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: deptboard <command> [options]");
            eprintln!("       deptboard --help for more information");
            Ok(())
        }
        Some(Commands::Merge {
            files,
            manifest,
            json,
            output,
            quiet,
        }) => merge::cmd_merge(files, manifest, json, output, quiet),
        Some(Commands::Export {
            files,
            manifest,
            name,
            summary,
            org,
            template,
            store_dir,
            output,
            no_save,
            json,
            quiet,
        }) => export::cmd_export(
            files, manifest, name, summary, org, template, store_dir, output, no_save, json,
            quiet,
        ),
        Some(Commands::Diff {
            current,
            previous,
            json,
            quiet,
        }) => diff::cmd_diff(current, previous, json, quiet),
        Some(Commands::Snapshots { command }) => snapshots::cmd_snapshots(command),
        Some(Commands::Inspect { file, json }) => inspect::cmd_inspect(file, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
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
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    /// Create error from a report error with its registry exit code.
    pub fn report(err: ReportError) -> Self {
        let code = report_exit_code(&err);
        let hint = match &err {
            ReportError::UnsupportedFormat { .. } => {
                Some("supported formats: .xlsx, .xls, .csv".to_string())
            }
            ReportError::ManifestInvalid(_) => {
                Some("see `deptboard merge --help` for the manifest layout".to_string())
            }
            _ => None,
        };
        Self {
            code,
            message: err.to_string(),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
