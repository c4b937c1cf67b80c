use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::reconcile::paths::resolve_paths;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/remig_env_allowlist.rs"));
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths();
    let mut report = CommandReport::new("doctor");

    report.detail(format!("primary_dir={}", paths.primary_dir.display()));
    report.detail(format!("backup_dir={}", paths.backup_dir.display()));
    report.detail(format!("out_dir={}", paths.out_dir.display()));
    report.detail(format!("report_file={}", paths.report_file.display()));
    report.detail(format!("script_file={}", paths.script_file.display()));

    if !paths.primary_dir.is_dir() {
        report.issue(format!(
            "primary migrations dir missing: {}",
            paths.primary_dir.display()
        ));
    }
    if !paths.backup_dir.is_dir() {
        report.detail(format!(
            "backup dir missing (treated as empty): {}",
            paths.backup_dir.display()
        ));
    }

    for key in generated::GENERATED_REMIG_ENV_ALLOWLIST {
        match env::var(key) {
            Ok(v) if !v.trim().is_empty() => report.detail(format!("env {key}={}", v.trim())),
            _ => report.detail(format!("env {key} unset")),
        }
    }

    Ok(report)
}
