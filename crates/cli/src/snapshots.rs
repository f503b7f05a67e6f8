//! `deptboard snapshots` — inspect the on-disk snapshot store.

use clap::Subcommand;
use serde::Serialize;

use deptboard_report::SnapshotStore;

use crate::util::{open_store, report_failure};
use crate::CliError;

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List stored snapshots as organization/template pairs
    #[command(after_help = "\
Examples:
  deptboard snapshots list
  deptboard snapshots list --store-dir ./store --json")]
    List {
        /// Snapshot store directory
        #[arg(long, env = "DEPTBOARD_STORE_DIR")]
        store_dir: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one stored snapshot as JSON
    #[command(after_help = "\
Examples:
  deptboard snapshots show --org acme --template weekly
  deptboard snapshots show --org acme --template weekly > previous.json")]
    Show {
        /// Organization the snapshot belongs to
        #[arg(long)]
        org: String,

        /// Template key within the organization
        #[arg(long)]
        template: String,

        /// Snapshot store directory
        #[arg(long, env = "DEPTBOARD_STORE_DIR")]
        store_dir: Option<String>,
    },
}

pub fn cmd_snapshots(cmd: SnapshotCommands) -> Result<(), CliError> {
    match cmd {
        SnapshotCommands::List { store_dir, json } => cmd_snapshots_list(store_dir, json),
        SnapshotCommands::Show {
            org,
            template,
            store_dir,
        } => cmd_snapshots_show(org, template, store_dir),
    }
}

#[derive(Serialize)]
struct ListEntry<'a> {
    organization: &'a str,
    template: &'a str,
}

fn cmd_snapshots_list(store_dir: Option<String>, json: bool) -> Result<(), CliError> {
    let store = open_store(store_dir.as_deref(), json)?;
    let entries = store.list().map_err(|e| report_failure(e, json))?;

    if json {
        let rows: Vec<ListEntry> = entries
            .iter()
            .map(|(org, template)| ListEntry {
                organization: org,
                template,
            })
            .collect();
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        if entries.is_empty() {
            eprintln!("no snapshots in {}", store.root().display());
        }
        for (org, template) in &entries {
            println!("{org}/{template}");
        }
    }
    Ok(())
}

fn cmd_snapshots_show(
    org: String,
    template: String,
    store_dir: Option<String>,
) -> Result<(), CliError> {
    let store = open_store(store_dir.as_deref(), false)?;
    match store.get(&org, &template).map_err(CliError::report)? {
        Some(snapshot) => {
            let out = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
            println!("{out}");
            Ok(())
        }
        None => Err(CliError::io(format!("no snapshot stored for {org}/{template}"))
            .with_hint("run `deptboard snapshots list` to see stored templates")),
    }
}
