use crate::repo::{git_output, git_stdout};
use crate::settings::GitSettings;
use anyhow::{Context, Result};
use std::path::Path;

/// `<prefix><root>/<child>`, both full hashes.
pub fn preservation_ref_name(settings: &GitSettings, root_full: &str, child_full: &str) -> String {
    format!("{}{root_full}/{child_full}", settings.archive_prefix)
}

/// Point one ref per child at that child so pre-squash commits stay
/// reachable after the rewrite. Re-running is harmless.
pub fn create_preservation_refs(
    repo: &Path,
    settings: &GitSettings,
    root_full: &str,
    children_full: &[String],
) -> Result<()> {
    for child in children_full {
        let name = preservation_ref_name(settings, root_full, child);
        git_stdout(repo, &["update-ref", &name, child])
            .with_context(|| format!("preserving {child} as {name}"))?;
    }
    Ok(())
}

/// True only when every child's preservation ref exists.
pub fn preservation_refs_exist(
    repo: &Path,
    settings: &GitSettings,
    root_full: &str,
    children_full: &[String],
) -> Result<bool> {
    for child in children_full {
        let name = preservation_ref_name(settings, root_full, child);
        let output = git_output(repo, &["show-ref", "--verify", "--quiet", &name])?;
        if !output.status.success() {
            return Ok(false);
        }
    }
    Ok(true)
}
