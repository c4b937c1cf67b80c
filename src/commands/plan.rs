use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::reconcile::config::{ReconcilePolicy, load_policy};
use crate::reconcile::paths::resolve_paths;
use crate::reconcile::plan::build_plan;
use crate::reconcile::report::{render_report, write_report};
use crate::reconcile::scan::scan_sources;
use crate::reconcile::script::{render_script, write_script};

#[derive(Debug, Clone, Default)]
pub struct PlanArgs {
    pub primary: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub epoch: Option<String>,
    pub prefer_backup: bool,
    pub move_files: bool,
    /// JSON mode: keep stdout machine-parseable by folding the plan table
    /// into the report details instead of printing it.
    pub json: bool,
}

fn apply_overrides(mut policy: ReconcilePolicy, args: &PlanArgs) -> ReconcilePolicy {
    if let Some(epoch) = &args.epoch {
        policy.epoch = epoch.clone();
    }
    if args.prefer_backup {
        policy.prefer_backup = true;
    }
    policy
}

pub fn run(args: PlanArgs) -> Result<CommandReport> {
    let mut report = CommandReport::new("plan");

    let paths = resolve_paths().with_overrides(
        args.primary.clone(),
        args.backup.clone(),
        args.out_dir.clone(),
    );
    let policy = apply_overrides(load_policy(&paths.primary_dir)?, &args);
    // Reject a bad --epoch before any scanning happens.
    policy.epoch_instant()?;

    report.detail(format!("primary_dir={}", paths.primary_dir.display()));
    report.detail(format!("backup_dir={}", paths.backup_dir.display()));

    let outcome = scan_sources(&paths.primary_dir, &paths.backup_dir, &policy.extension)?;
    let plan = build_plan(outcome, &policy)?;

    if args.json {
        for line in render_report(&plan).lines() {
            report.detail(line);
        }
    } else {
        print!("{}", render_report(&plan));
    }

    report.detail(format!("planned={}", plan.entries.len()));
    report.detail(format!("duplicates={}", plan.collisions.len()));
    report.detail(format!("skipped={}", plan.skipped.len()));

    write_report(&paths.report_file, &plan)?;
    report.detail(format!("report={}", paths.report_file.display()));

    if plan.entries.is_empty() {
        report.detail("no migration files found; script not written");
        return Ok(report);
    }

    let script = render_script(&plan, &paths.primary_dir, args.move_files);
    write_script(&paths.script_file, &script)?;
    report.detail(format!("script={}", paths.script_file.display()));
    report.detail("nothing was renamed; run the generated script to apply");

    Ok(report)
}
