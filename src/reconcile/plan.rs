use anyhow::{Context, Result};
use chrono::Duration;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::reconcile::config::ReconcilePolicy;
use crate::reconcile::scan::{ScanOutcome, ScannedFile, SourceTag};
use crate::reconcile::timestamp;

/// The same filename was found in both source directories; one copy was
/// kept per policy, the other discarded.
#[derive(Debug, Clone)]
pub struct Collision {
    pub file_name: String,
    pub kept: SourceTag,
    /// Whether the two copies were byte-identical. `None` when either copy
    /// could not be read back for hashing.
    pub identical: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub original: ScannedFile,
    pub new_file_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    /// Ordered by original timestamp ascending; new names strictly increase.
    pub entries: Vec<PlanEntry>,
    pub collisions: Vec<Collision>,
    pub skipped: Vec<String>,
    pub missing_dirs: Vec<PathBuf>,
}

fn file_hash(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

fn contents_identical(a: &Path, b: &Path) -> Option<bool> {
    let ha = file_hash(a).ok()?;
    let hb = file_hash(b).ok()?;
    Some(ha == hb)
}

/// Collapse the scan result to one entry per filename. With
/// `prefer_backup = false` the first-seen (primary) copy wins; with
/// `prefer_backup = true` a later copy replaces it in place, so the
/// filename keeps its first-seen position.
pub fn deduplicate(files: Vec<ScannedFile>, prefer_backup: bool) -> (Vec<ScannedFile>, Vec<Collision>) {
    let mut unique: Vec<ScannedFile> = Vec::with_capacity(files.len());
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    let mut collisions = Vec::new();

    for file in files {
        match index_by_name.get(&file.file_name) {
            None => {
                index_by_name.insert(file.file_name.clone(), unique.len());
                unique.push(file);
            }
            Some(&idx) => {
                let kept_first = !prefer_backup;
                let existing = &unique[idx];
                let identical = contents_identical(&existing.full_path(), &file.full_path());
                let kept_tag = if kept_first { existing.tag } else { file.tag };
                collisions.push(Collision {
                    file_name: file.file_name.clone(),
                    kept: kept_tag,
                    identical,
                });
                if !kept_first {
                    unique[idx] = file;
                }
            }
        }
    }

    (unique, collisions)
}

/// Renumber the unique set: sort by original timestamp (stable) and assign
/// `epoch + N * step_days` to the Nth file, zero-indexed.
pub fn renumber(mut unique: Vec<ScannedFile>, policy: &ReconcilePolicy) -> Result<Vec<PlanEntry>> {
    let epoch = policy.epoch_instant()?;
    let step_days = i64::try_from(policy.step_days).context("step days out of range")?;
    unique.sort_by_key(|f| f.timestamp);

    let mut entries = Vec::with_capacity(unique.len());
    for (i, original) in unique.into_iter().enumerate() {
        let offset_days = (i as i64)
            .checked_mul(step_days)
            .context("renumbering offset overflow")?;
        let offset = Duration::try_days(offset_days).context("renumbering offset out of range")?;
        let new_ts = epoch
            .checked_add_signed(offset)
            .context("renumbered timestamp out of range")?;
        let suffix = timestamp::descriptive_suffix(&original.file_name).to_string();
        let new_file_name = format!("{}_{}", timestamp::format_timestamp(new_ts), suffix);
        entries.push(PlanEntry {
            original,
            new_file_name,
        });
    }

    Ok(entries)
}

pub fn build_plan(outcome: ScanOutcome, policy: &ReconcilePolicy) -> Result<RenamePlan> {
    let ScanOutcome {
        files,
        skipped,
        missing_dirs,
    } = outcome;

    let (unique, collisions) = deduplicate(files, policy.prefer_backup);
    let entries = renumber(unique, policy)?;

    Ok(RenamePlan {
        entries,
        collisions,
        skipped,
        missing_dirs,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_plan, deduplicate, renumber};
    use crate::reconcile::config::ReconcilePolicy;
    use crate::reconcile::scan::{ScanOutcome, ScannedFile, SourceTag};
    use crate::reconcile::timestamp::parse_prefix;
    use std::path::PathBuf;

    fn scanned(name: &str, dir: &str, tag: SourceTag) -> ScannedFile {
        ScannedFile {
            file_name: name.to_string(),
            timestamp: parse_prefix(name).expect("test name parses"),
            dir: PathBuf::from(dir),
            tag,
        }
    }

    #[test]
    fn primary_wins_on_conflict() {
        let files = vec![
            scanned("20230601120000_add_users.sql", "primary", SourceTag::Primary),
            scanned("20230601120000_add_users.sql", "backup", SourceTag::Backup),
        ];
        let (unique, collisions) = deduplicate(files, false);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].tag, SourceTag::Primary);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].kept, SourceTag::Primary);
    }

    #[test]
    fn prefer_backup_replaces_in_place() {
        let files = vec![
            scanned("20230601120000_add_users.sql", "primary", SourceTag::Primary),
            scanned("20230701130000_later.sql", "primary", SourceTag::Primary),
            scanned("20230601120000_add_users.sql", "backup", SourceTag::Backup),
        ];
        let (unique, collisions) = deduplicate(files, true);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].tag, SourceTag::Backup);
        assert_eq!(unique[0].file_name, "20230601120000_add_users.sql");
        assert_eq!(collisions[0].kept, SourceTag::Backup);
    }

    #[test]
    fn renumber_starts_at_epoch_and_steps_daily() {
        let files = vec![
            scanned("20230601120000_add_users.sql", "primary", SourceTag::Primary),
            scanned("20230501090000_init.sql", "backup", SourceTag::Backup),
        ];
        let entries = renumber(files, &ReconcilePolicy::default()).expect("renumber");
        assert_eq!(entries[0].new_file_name, "20240101000000_init.sql");
        assert_eq!(entries[1].new_file_name, "20240102000000_add_users.sql");
    }

    #[test]
    fn renumbering_is_injective_and_order_preserving() {
        let files = (1..=9)
            .map(|d| {
                scanned(
                    &format!("2023010{d}000000_m{d}.sql"),
                    "primary",
                    SourceTag::Primary,
                )
            })
            .collect::<Vec<_>>();
        let entries = renumber(files, &ReconcilePolicy::default()).expect("renumber");
        let new_names = entries
            .iter()
            .map(|e| e.new_file_name.clone())
            .collect::<Vec<_>>();
        let mut sorted = new_names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, new_names);
    }

    #[test]
    fn equal_timestamps_keep_scan_order() {
        let files = vec![
            scanned("20230601120000_first.sql", "primary", SourceTag::Primary),
            scanned("20230601120000_second.sql", "primary", SourceTag::Primary),
        ];
        let entries = renumber(files, &ReconcilePolicy::default()).expect("renumber");
        assert_eq!(entries[0].new_file_name, "20240101000000_first.sql");
        assert_eq!(entries[1].new_file_name, "20240102000000_second.sql");
    }

    #[test]
    fn oversized_step_days_is_an_error_not_a_panic() {
        let files = vec![
            scanned("20230501090000_init.sql", "primary", SourceTag::Primary),
            scanned("20230601120000_add_users.sql", "primary", SourceTag::Primary),
        ];
        let policy = ReconcilePolicy {
            step_days: 200_000_000_000,
            ..ReconcilePolicy::default()
        };
        assert!(renumber(files, &policy).is_err());

        let files = vec![
            scanned("20230501090000_init.sql", "primary", SourceTag::Primary),
            scanned("20230601120000_add_users.sql", "primary", SourceTag::Primary),
        ];
        let policy = ReconcilePolicy {
            step_days: u64::MAX,
            ..ReconcilePolicy::default()
        };
        assert!(renumber(files, &policy).is_err());
    }

    #[test]
    fn two_source_scenario_renumbers_and_dedupes() {
        let outcome = ScanOutcome {
            files: vec![
                scanned("20230601120000_add_users.sql", "primary", SourceTag::Primary),
                scanned("20230601120000_add_users.sql", "backup", SourceTag::Backup),
                scanned("20230501090000_init.sql", "backup", SourceTag::Backup),
            ],
            skipped: vec!["notatimestamp_foo.sql".to_string()],
            missing_dirs: Vec::new(),
        };
        let plan = build_plan(outcome, &ReconcilePolicy::default()).expect("plan");
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[0].new_file_name, "20240101000000_init.sql");
        assert_eq!(
            plan.entries[1].new_file_name,
            "20240102000000_add_users.sql"
        );
        assert_eq!(plan.entries[1].original.tag, SourceTag::Primary);
        assert!(plan.entries.iter().all(|e| !e
            .new_file_name
            .contains("notatimestamp")));
    }
}
