use crate::repo::git_stdout;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Marker carried by every script we install.
const HOOK_MARKER: &str = "git squash-tree";

/// Embedded hook scripts, keyed by hook name.
pub const HOOKS: &[(&str, &str)] = &[
    ("pre-rebase", include_str!("../hooks/pre-rebase")),
    ("post-rewrite", include_str!("../hooks/post-rewrite")),
    ("post-merge", include_str!("../hooks/post-merge")),
    ("prepare-commit-msg", include_str!("../hooks/prepare-commit-msg")),
    ("post-commit", include_str!("../hooks/post-commit")),
];

/// Script body for `name`, if it is one of ours.
pub fn script(name: &str) -> Option<&'static str> {
    HOOKS.iter().find(|(n, _)| *n == name).map(|(_, body)| *body)
}

/// Write every hook into `dir` (created if missing) with the executable bit
/// set. A foreign hook already at the same path is moved to
/// `<name>.squash-tree.bak` first.
pub fn write_hooks(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = Vec::with_capacity(HOOKS.len());
    for (name, body) in HOOKS {
        let path = dir.join(name);
        if let Ok(existing) = fs::read_to_string(&path) {
            if !existing.contains(HOOK_MARKER) {
                let backup = dir.join(format!("{name}.squash-tree.bak"));
                warn!(hook = name, backup = %backup.display(), "backing up existing hook");
                fs::rename(&path, &backup)?;
            }
        }
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        make_executable(&path)?;
        written.push(path);
    }
    info!(dir = %dir.display(), count = written.len(), "hooks installed");
    Ok(written)
}

/// Hooks directory used by `init --global`.
pub fn global_hooks_dir(home: &Path) -> PathBuf {
    home.join(".config").join("git").join("squash-tree-hooks")
}

/// Install hooks into `dir` and point `core.hooksPath` at it for every repo.
pub fn install_global(dir: &Path) -> Result<()> {
    write_hooks(dir)?;
    let dir_str = dir.to_string_lossy();
    git_stdout(
        Path::new("."),
        &["config", "--global", "core.hooksPath", &dir_str],
    )
    .context("set core.hooksPath")?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
