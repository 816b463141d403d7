use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Run `git <args>` inside `repo` and return its raw output.
pub(crate) fn git_output(repo: &Path, args: &[&str]) -> Result<Output> {
    debug!(repo = %repo.display(), ?args, "git");
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .with_context(|| format!("running git {}", args.join(" ")))
}

/// Run `git <args>` and return trimmed stdout, failing on a non-zero exit.
pub(crate) fn git_stdout(repo: &Path, args: &[&str]) -> Result<String> {
    let output = git_output(repo, args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Walk up from `start` to the nearest directory containing `.git`.
pub fn find_git_repo(start: &Path) -> Result<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()?.join(start)
    };
    for dir in start.ancestors() {
        if dir.join(".git").exists() {
            return Ok(dir.to_path_buf());
        }
    }
    bail!("no .git found in {} or any parent", start.display())
}

/// Abbreviated hash of the commit `rev` names.
pub fn resolve_commit_hash(repo: &Path, rev: &str) -> Result<String> {
    let spec = format!("{rev}^{{commit}}");
    let output = git_output(repo, &["rev-parse", "--verify", "--quiet", "--short", &spec])?;
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || hash.is_empty() {
        bail!("unknown commit: {rev}");
    }
    Ok(hash)
}

/// Resolve every ref in order, naming the first one that fails.
pub fn resolve_refs(repo: &Path, refs: &[String]) -> Result<Vec<String>> {
    refs.iter()
        .map(|r| resolve_commit_hash(repo, r).with_context(|| format!("resolve {r:?}")))
        .collect()
}

/// Full 40-character hash of the commit `rev` names.
pub fn full_hash(repo: &Path, rev: &str) -> Result<String> {
    let spec = format!("{rev}^{{commit}}");
    git_stdout(repo, &["rev-parse", "--verify", &spec]).with_context(|| format!("rev-parse {rev}"))
}

/// `hooks/` under the repository's common git dir (shared by worktrees).
pub fn hooks_dir(repo: &Path) -> Result<PathBuf> {
    let common = PathBuf::from(git_stdout(repo, &["rev-parse", "--git-common-dir"])?);
    let common = if common.is_absolute() {
        common
    } else {
        repo.join(common)
    };
    Ok(common.join("hooks"))
}
