use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "remig",
    version,
    about = "Reconcile and renumber timestamped migration files"
)]
pub struct Cli {
    /// Emit the command report as JSON instead of plain lines.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the rename plan and write the report and apply script.
    Plan {
        /// Primary migrations directory (wins on conflicts by default).
        #[arg(long)]
        primary: Option<PathBuf>,
        /// Backup migrations directory.
        #[arg(long)]
        backup: Option<PathBuf>,
        /// Directory the report and script are written into.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// New timestamp assigned to the first file, 14 digits.
        #[arg(long)]
        epoch: Option<String>,
        /// Keep the backup copy when both directories hold the same filename.
        #[arg(long)]
        prefer_backup: bool,
        /// Move backup-sourced files instead of copying them.
        #[arg(long = "move")]
        move_files: bool,
    },
    /// Read-only summary of both directories: counts, skips, duplicates.
    Scan {
        #[arg(long)]
        primary: Option<PathBuf>,
        #[arg(long)]
        backup: Option<PathBuf>,
    },
    /// Show resolved paths and recognized REMIG_* environment overrides.
    Doctor,
}

fn render_human(report: &CommandReport) {
    for detail in &report.details {
        println!("{detail}");
    }
    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Plan {
            primary,
            backup,
            out_dir,
            epoch,
            prefer_backup,
            move_files,
        } => commands::plan::run(commands::plan::PlanArgs {
            primary,
            backup,
            out_dir,
            epoch,
            prefer_backup,
            move_files,
            json: cli.json,
        })?,
        Commands::Scan { primary, backup } => {
            commands::scan::run(commands::scan::ScanArgs { primary, backup })?
        }
        Commands::Doctor => commands::doctor::run()?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_human(&report);
    }

    if !report.ok {
        anyhow::bail!("{} reported {} issue(s)", report.command, report.issues.len());
    }
    Ok(())
}
