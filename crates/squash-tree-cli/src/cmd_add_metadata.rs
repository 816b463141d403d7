use anyhow::{bail, Context};
use squash_tree_core::SquashSource;
use squash_tree_git::repo::{find_git_repo, resolve_commit_hash, resolve_refs};
use squash_tree_git::{write_metadata, GitNotes, GitSettings};
use std::path::Path;
use tracing::info;

pub fn execute(
    cwd: &Path,
    root: &str,
    base: &str,
    children: &[String],
    strategy: &str,
) -> anyhow::Result<()> {
    let repo = find_git_repo(cwd).context("not a git repository")?;
    record_squash(&repo, &GitSettings::from_env(), root, base, children, strategy)?;
    Ok(())
}

/// Resolve the refs and write a squash record for `root`. Returns `false`
/// without touching anything when `root` already has one.
pub fn record_squash(
    repo: &Path,
    settings: &GitSettings,
    root: &str,
    base: &str,
    children: &[String],
    strategy: &str,
) -> anyhow::Result<bool> {
    let notes = GitNotes::new(repo, settings.clone());
    if notes.has_metadata(root) {
        info!(root, "squash metadata already recorded");
        return Ok(false);
    }

    let root_hash = resolve_commit_hash(repo, root).context("invalid root")?;
    let base_hash = resolve_commit_hash(repo, base).context("invalid base")?;
    let child_refs: Vec<String> = children
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if child_refs.is_empty() {
        bail!("add-metadata requires at least one child commit");
    }
    let child_hashes = resolve_refs(repo, &child_refs).context("children")?;

    write_metadata(repo, settings, &root_hash, &base_hash, &child_hashes, strategy)
        .context("write metadata")?;
    Ok(true)
}
