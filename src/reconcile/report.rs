use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::reconcile::plan::{Collision, RenamePlan};

fn collision_note(collision: &Collision) -> String {
    let verdict = match collision.identical {
        Some(true) => "copies identical",
        Some(false) => "copies differ",
        None => "copies unverified",
    };
    format!("duplicate, kept {} ({verdict})", collision.kept.as_str())
}

/// Render the plan as a fixed-width table with a trailer for skipped names
/// and missing directories.
pub fn render_report(plan: &RenamePlan) -> String {
    let notes: HashMap<&str, String> = plan
        .collisions
        .iter()
        .map(|c| (c.file_name.as_str(), collision_note(c)))
        .collect();

    let mut original_width = "ORIGINAL".len();
    let mut new_width = "NEW".len();
    for entry in &plan.entries {
        original_width = original_width.max(entry.original.file_name.len());
        new_width = new_width.max(entry.new_file_name.len());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:original_width$}  {:new_width$}  {:7}  NOTE\n",
        "ORIGINAL", "NEW", "SOURCE"
    ));
    for entry in &plan.entries {
        let note = notes
            .get(entry.original.file_name.as_str())
            .map(String::as_str)
            .unwrap_or("");
        out.push_str(&format!(
            "{:original_width$}  {:new_width$}  {:7}  {}\n",
            entry.original.file_name,
            entry.new_file_name,
            entry.original.tag.as_str(),
            note
        ));
    }

    out.push_str(&format!("\n{} file(s) planned\n", plan.entries.len()));

    if !plan.skipped.is_empty() {
        out.push_str("\nskipped (no valid timestamp prefix):\n");
        for name in &plan.skipped {
            out.push_str(&format!("  {name}\n"));
        }
    }
    if !plan.missing_dirs.is_empty() {
        out.push_str("\nmissing source directories (treated as empty):\n");
        for dir in &plan.missing_dirs {
            out.push_str(&format!("  {}\n", dir.display()));
        }
    }

    out
}

pub fn write_report(path: &Path, plan: &RenamePlan) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, render_report(plan))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
