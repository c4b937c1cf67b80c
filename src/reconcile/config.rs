use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::reconcile::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// Recognized migration file extension, without the dot.
    pub extension: String,
    /// 14-digit `YYYYMMDDHHMMSS` instant assigned to the first file in
    /// sorted order.
    pub epoch: String,
    /// Days between consecutive assigned timestamps.
    pub step_days: u64,
    /// When the same filename exists in both directories, keep the backup
    /// copy instead of the primary one.
    pub prefer_backup: bool,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            extension: "sql".to_string(),
            epoch: "20240101000000".to_string(),
            step_days: 1,
            prefer_backup: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialReconcilePolicy {
    extension: Option<String>,
    epoch: Option<String>,
    step_days: Option<u64>,
    prefer_backup: Option<bool>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

/// Sibling of the primary migrations directory, e.g.
/// `supabase/remig.toml` for a `supabase/migrations` primary.
fn fallback_config_path(primary_dir: &Path) -> PathBuf {
    let parent = match primary_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    parent.join("remig.toml")
}

fn merge_file_config(base: &mut ReconcilePolicy, primary_dir: &Path) -> Result<()> {
    let path = match env::var("REMIG_CONFIG_PATH") {
        Ok(custom) if !custom.trim().is_empty() => {
            let path = PathBuf::from(custom.trim());
            // An explicitly requested config file must exist.
            if !path.exists() {
                return Err(anyhow!(
                    "REMIG_CONFIG_PATH points at {}, which does not exist",
                    path.display()
                ));
            }
            path
        }
        _ => {
            let fallback = fallback_config_path(primary_dir);
            if !fallback.exists() {
                return Ok(());
            }
            fallback
        }
    };

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialReconcilePolicy = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse remig config {}: {err}", path.display()))?;
    if let Some(extension) = parsed.extension {
        base.extension = extension;
    }
    if let Some(epoch) = parsed.epoch {
        base.epoch = epoch;
    }
    if let Some(step_days) = parsed.step_days {
        base.step_days = step_days;
    }
    if let Some(prefer_backup) = parsed.prefer_backup {
        base.prefer_backup = prefer_backup;
    }
    Ok(())
}

fn validate(cfg: &ReconcilePolicy) -> Result<()> {
    if cfg.extension.trim().is_empty() || cfg.extension.starts_with('.') {
        return Err(anyhow!(
            "invalid extension `{}`: use a bare extension such as `sql`",
            cfg.extension
        ));
    }
    if timestamp::parse_prefix(&cfg.epoch).is_err() {
        return Err(anyhow!(
            "invalid epoch `{}`: expected 14 digits forming a valid YYYYMMDDHHMMSS instant",
            cfg.epoch
        ));
    }
    if cfg.step_days == 0 {
        return Err(anyhow!("invalid step days: must be >= 1"));
    }
    Ok(())
}

pub fn load_policy(primary_dir: &Path) -> Result<ReconcilePolicy> {
    let mut cfg = ReconcilePolicy::default();
    merge_file_config(&mut cfg, primary_dir)?;

    cfg.extension = env_or_string("REMIG_EXTENSION", &cfg.extension);
    cfg.epoch = env_or_string("REMIG_EPOCH", &cfg.epoch);
    cfg.step_days = env_or_u64("REMIG_STEP_DAYS", cfg.step_days);
    cfg.prefer_backup = env_or_bool("REMIG_PREFER_BACKUP", cfg.prefer_backup);

    validate(&cfg)?;
    Ok(cfg)
}

impl ReconcilePolicy {
    pub fn epoch_instant(&self) -> Result<NaiveDateTime> {
        timestamp::parse_prefix(&self.epoch)
            .map_err(|err| anyhow!("invalid epoch `{}`: {err}", self.epoch))
    }
}
