use std::env;
use std::path::PathBuf;

pub const DEFAULT_REPORT_FILE: &str = "migration_rename_report.txt";
pub const DEFAULT_SCRIPT_FILE: &str = "apply_migration_renames.sh";

#[derive(Debug, Clone)]
pub struct ReconcilerPaths {
    pub primary_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub out_dir: PathBuf,
    pub report_file: PathBuf,
    pub script_file: PathBuf,
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> ReconcilerPaths {
    let primary_dir =
        env_or_default_path("REMIG_PRIMARY_DIR", PathBuf::from("supabase/migrations"));
    let backup_dir = env_or_default_path(
        "REMIG_BACKUP_DIR",
        PathBuf::from("supabase/migrations_backup"),
    );
    let out_dir = env_or_default_path("REMIG_OUT_DIR", PathBuf::from("."));
    let report_file = out_dir.join(DEFAULT_REPORT_FILE);
    let script_file = out_dir.join(DEFAULT_SCRIPT_FILE);

    ReconcilerPaths {
        primary_dir,
        backup_dir,
        out_dir,
        report_file,
        script_file,
    }
}

impl ReconcilerPaths {
    /// Apply CLI-level overrides on top of the env/default resolution.
    pub fn with_overrides(
        mut self,
        primary: Option<PathBuf>,
        backup: Option<PathBuf>,
        out_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(primary) = primary {
            self.primary_dir = primary;
        }
        if let Some(backup) = backup {
            self.backup_dir = backup;
        }
        if let Some(out_dir) = out_dir {
            self.out_dir = out_dir;
        }
        self.report_file = self.out_dir.join(DEFAULT_REPORT_FILE);
        self.script_file = self.out_dir.join(DEFAULT_SCRIPT_FILE);
        self
    }
}
