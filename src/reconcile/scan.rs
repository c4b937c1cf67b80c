use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

use crate::reconcile::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    Primary,
    Backup,
}

impl SourceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Backup => "backup",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub file_name: String,
    pub timestamp: NaiveDateTime,
    pub dir: PathBuf,
    pub tag: SourceTag,
}

impl ScannedFile {
    pub fn full_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Files with a valid timestamp prefix, primary entries first, each
    /// directory's entries in filename order.
    pub files: Vec<ScannedFile>,
    /// Names that matched the extension but failed timestamp parsing.
    pub skipped: Vec<String>,
    /// Source directories that did not exist (treated as empty).
    pub missing_dirs: Vec<PathBuf>,
}

fn matches_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}

fn scan_one_dir(
    dir: &Path,
    tag: SourceTag,
    extension: &str,
    out: &mut ScanOutcome,
) -> Result<()> {
    if !dir.is_dir() {
        out.missing_dirs.push(dir.to_path_buf());
        return Ok(());
    }

    let mut names = Vec::new();
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in read_dir {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };
        if name.starts_with('.') || !matches_extension(&name, extension) {
            continue;
        }
        names.push(name);
    }

    // read_dir order is OS-dependent; sort so the plan is a pure function
    // of directory contents.
    names.sort();

    for name in names {
        match timestamp::parse_prefix(&name) {
            Ok(ts) => out.files.push(ScannedFile {
                file_name: name,
                timestamp: ts,
                dir: dir.to_path_buf(),
                tag,
            }),
            Err(_) => out.skipped.push(name),
        }
    }

    Ok(())
}

/// Scan the primary directory, then the backup directory. Either may be
/// absent; unparsable names are skipped, never errors.
pub fn scan_sources(primary: &Path, backup: &Path, extension: &str) -> Result<ScanOutcome> {
    let mut out = ScanOutcome::default();
    scan_one_dir(primary, SourceTag::Primary, extension, &mut out)?;
    scan_one_dir(backup, SourceTag::Backup, extension, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{SourceTag, matches_extension, scan_sources};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extension_match_is_exact() {
        assert!(matches_extension("20230101000000_a.sql", "sql"));
        assert!(!matches_extension("20230101000000_a.sql.bak", "sql"));
        assert!(!matches_extension("20230101000000_a", "sql"));
    }

    #[test]
    fn scan_skips_hidden_and_unparsable_names() {
        let tmp = tempdir().expect("tempdir");
        let primary = tmp.path().join("migrations");
        fs::create_dir_all(&primary).expect("mkdir");

        fs::write(primary.join("20230601120000_add_users.sql"), "select 1;").expect("write");
        fs::write(primary.join("notatimestamp_foo.sql"), "select 2;").expect("write");
        fs::write(primary.join(".20230601120000_hidden.sql"), "").expect("write");
        fs::write(primary.join("20231301000000_bad_month.sql"), "").expect("write");

        let out = scan_sources(&primary, &tmp.path().join("absent"), "sql").expect("scan");

        assert_eq!(out.files.len(), 1);
        assert_eq!(out.files[0].file_name, "20230601120000_add_users.sql");
        assert_eq!(out.files[0].tag, SourceTag::Primary);
        assert_eq!(
            out.skipped,
            vec![
                "20231301000000_bad_month.sql".to_string(),
                "notatimestamp_foo.sql".to_string()
            ]
        );
        assert_eq!(out.missing_dirs.len(), 1);
    }

    #[test]
    fn scan_lists_primary_before_backup() {
        let tmp = tempdir().expect("tempdir");
        let primary = tmp.path().join("migrations");
        let backup = tmp.path().join("backup");
        fs::create_dir_all(&primary).expect("mkdir");
        fs::create_dir_all(&backup).expect("mkdir");

        fs::write(primary.join("20230601120000_b.sql"), "").expect("write");
        fs::write(backup.join("20230501090000_a.sql"), "").expect("write");

        let out = scan_sources(&primary, &backup, "sql").expect("scan");
        let tags = out.files.iter().map(|f| f.tag).collect::<Vec<_>>();
        assert_eq!(tags, vec![SourceTag::Primary, SourceTag::Backup]);
    }
}
