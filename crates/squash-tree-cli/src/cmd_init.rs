use anyhow::Context;
use squash_tree_git::hooks::{global_hooks_dir, install_global, write_hooks};
use squash_tree_git::repo::{find_git_repo, hooks_dir};
use std::path::Path;

pub fn execute(cwd: &Path, global: bool) -> anyhow::Result<()> {
    if global {
        let home = dirs::home_dir().context("cannot determine home directory")?;
        let dir = global_hooks_dir(&home);
        install_global(&dir)?;
        println!(
            "Global hooks installed at {}. All repos will use squash-tree hooks.",
            dir.display()
        );
        return Ok(());
    }

    let repo = find_git_repo(cwd).context("not a git repository")?;
    let dir = hooks_dir(&repo)?;
    write_hooks(&dir).context("write hooks")?;
    println!("Git hooks installed. Squash metadata will be recorded automatically.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use squash_tree_git::testutil::{git_available, init_repo};

    #[test]
    fn installs_into_repo_hooks_dir() {
        if !git_available() {
            return;
        }
        let dir = init_repo();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();

        execute(&sub, false).unwrap();

        let hooks = hooks_dir(dir.path()).unwrap();
        assert!(hooks.join("post-rewrite").is_file());
        assert!(hooks.join("pre-rebase").is_file());
    }
}
