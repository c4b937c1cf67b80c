use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::reconcile::config::load_policy;
use crate::reconcile::paths::resolve_paths;
use crate::reconcile::plan::deduplicate;
use crate::reconcile::scan::{SourceTag, scan_sources};

#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    pub primary: Option<PathBuf>,
    pub backup: Option<PathBuf>,
}

pub fn run(args: ScanArgs) -> Result<CommandReport> {
    let mut report = CommandReport::new("scan");

    let paths = resolve_paths().with_overrides(args.primary, args.backup, None);
    let policy = load_policy(&paths.primary_dir)?;

    report.detail(format!("primary_dir={}", paths.primary_dir.display()));
    report.detail(format!("backup_dir={}", paths.backup_dir.display()));

    let outcome = scan_sources(&paths.primary_dir, &paths.backup_dir, &policy.extension)?;

    let primary_count = outcome
        .files
        .iter()
        .filter(|f| f.tag == SourceTag::Primary)
        .count();
    let backup_count = outcome.files.len() - primary_count;
    report.detail(format!("primary_files={primary_count}"));
    report.detail(format!("backup_files={backup_count}"));

    for name in &outcome.skipped {
        report.detail(format!("skipped={name}"));
    }
    for dir in &outcome.missing_dirs {
        report.detail(format!("missing_dir={}", dir.display()));
    }

    let (unique, collisions) = deduplicate(outcome.files, policy.prefer_backup);
    report.detail(format!("unique_files={}", unique.len()));
    for collision in &collisions {
        let verdict = match collision.identical {
            Some(true) => "identical",
            Some(false) => "differs",
            None => "unverified",
        };
        report.detail(format!(
            "duplicate={} kept={} content={verdict}",
            collision.file_name,
            collision.kept.as_str()
        ));
    }

    Ok(report)
}
