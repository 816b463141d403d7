use anyhow::Context;
use squash_tree_core::{build_tree, render, render_detailed};
use squash_tree_git::repo::{find_git_repo, resolve_commit_hash};
use squash_tree_git::{GitNotes, GitSettings};
use std::path::Path;

pub fn execute(cwd: &Path, commit: &str, details: bool) -> anyhow::Result<()> {
    print!("{}", tree_text(cwd, &GitSettings::from_env(), commit, details)?);
    Ok(())
}

/// Resolve `commit` and render its squash tree.
fn tree_text(
    cwd: &Path,
    settings: &GitSettings,
    commit: &str,
    details: bool,
) -> anyhow::Result<String> {
    let repo = find_git_repo(cwd).context("not a git repository")?;
    let hash = resolve_commit_hash(&repo, commit).with_context(|| format!("resolve {commit:?}"))?;

    let notes = GitNotes::new(&repo, settings.clone());
    let tree = build_tree(&hash, &notes).context("build tree")?;
    Ok(if details {
        render_detailed(Some(&*tree))
    } else {
        render(Some(&*tree))
    })
}
