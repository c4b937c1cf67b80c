use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::reconcile::plan::RenamePlan;
use crate::reconcile::scan::SourceTag;

fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Render the bash script that materializes the plan. Fail-fast
/// (`set -euo pipefail`): a failing copy leaves the primary directory
/// partially modified, restorable from the snapshot taken in step 1.
///
/// Primary-sourced files are re-created from that snapshot because step 2
/// removes their original path; backup-sourced files come from their
/// original location (moved instead of copied with `move_files`).
pub fn render_script(plan: &RenamePlan, primary_dir: &Path, move_files: bool) -> String {
    let primary = primary_dir.display().to_string();

    let mut removals: BTreeSet<&str> = plan
        .collisions
        .iter()
        .map(|c| c.file_name.as_str())
        .collect();
    for entry in &plan.entries {
        if entry.original.tag == SourceTag::Primary {
            removals.insert(entry.original.file_name.as_str());
        }
    }

    let mut out = String::new();
    out.push_str("#!/usr/bin/env bash\n");
    out.push_str("# Generated by remig. Review the rename report before running.\n");
    out.push_str("set -euo pipefail\n\n");
    out.push_str(&format!("PRIMARY={}\n", sh_quote(&primary)));
    out.push_str("SNAPSHOT=\"${PRIMARY%/}.bak.$(date +%Y%m%d%H%M%S)\"\n\n");

    out.push_str("# 1. Snapshot the primary directory before anything destructive.\n");
    out.push_str("cp -R \"$PRIMARY\" \"$SNAPSHOT\"\n\n");

    out.push_str("# 2. Remove the matching files being renumbered.\n");
    for name in &removals {
        out.push_str(&format!("rm \"$PRIMARY\"/{}\n", sh_quote(name)));
    }

    out.push_str("\n# 3. Re-create each file at its new sequential name.\n");
    for entry in &plan.entries {
        let dest = format!("\"$PRIMARY\"/{}", sh_quote(&entry.new_file_name));
        match entry.original.tag {
            SourceTag::Primary => {
                let src = format!("\"$SNAPSHOT\"/{}", sh_quote(&entry.original.file_name));
                out.push_str(&format!("cp {src} {dest}\n"));
            }
            SourceTag::Backup => {
                let src = sh_quote(&entry.original.full_path().display().to_string());
                let verb = if move_files { "mv" } else { "cp" };
                out.push_str(&format!("{verb} {src} {dest}\n"));
            }
        }
    }

    out.push_str(&format!(
        "\necho \"done: {} file(s) renumbered; snapshot at $SNAPSHOT\"\n",
        plan.entries.len()
    ));

    out
}

/// Write the script atomically and mark it executable.
pub fn write_script(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o755);
        tmp.as_file()
            .set_permissions(perms)
            .with_context(|| format!("failed to chmod {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("failed to persist {}", path.display()))?;
    Ok(())
}
