use crate::archive::create_preservation_refs;
use crate::repo::{full_hash, git_output};
use crate::settings::GitSettings;
use anyhow::{bail, Context, Result};
use squash_tree_core::{SourceError, SquashRecord, SquashSource};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Reads squash records stored as git notes in one repository.
#[derive(Debug, Clone)]
pub struct GitNotes {
    repo: PathBuf,
    settings: GitSettings,
}

impl GitNotes {
    pub fn new(repo: impl Into<PathBuf>, settings: GitSettings) -> Self {
        Self {
            repo: repo.into(),
            settings,
        }
    }

    /// Raw note text for `id`, or `None` when no note is attached.
    pub fn read_note(&self, id: &str) -> Result<Option<String>> {
        let output = git_output(
            &self.repo,
            &["notes", "--ref", &self.settings.notes_ref, "show", id],
        )?;
        if !output.status.success() {
            // exit 1: no note for this object
            if output.status.code() == Some(1) {
                return Ok(None);
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git notes show {id} failed: {}", stderr.trim());
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }
}

impl SquashSource for GitNotes {
    fn commit_exists(&self, id: &str) -> bool {
        let spec = format!("{id}^{{commit}}");
        git_output(&self.repo, &["cat-file", "-e", &spec])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn has_metadata(&self, id: &str) -> bool {
        matches!(self.read_note(id), Ok(Some(_)))
    }

    fn read_metadata(&self, id: &str) -> Result<SquashRecord, SourceError> {
        let Some(text) = self.read_note(id)? else {
            return Err(format!("no squash metadata found for commit {id}").into());
        };
        Ok(SquashRecord::parse(text.as_bytes())?)
    }

    fn commit_subject(&self, id: &str) -> Option<String> {
        commit_subject(&self.repo, id)
    }
}

fn commit_subject(repo: &Path, id: &str) -> Option<String> {
    let output = git_output(repo, &["log", "-1", "--format=%s", id, "--"]).ok()?;
    if !output.status.success() {
        return None;
    }
    let subject = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!subject.is_empty()).then_some(subject)
}

/// Record `root` as a squash of `children` (already-resolved hashes, in
/// squash order) and keep each child reachable through a preservation ref.
pub fn write_metadata(
    repo: &Path,
    settings: &GitSettings,
    root: &str,
    base: &str,
    children: &[String],
    strategy: &str,
) -> Result<SquashRecord> {
    if children.is_empty() {
        bail!("at least one child commit required");
    }

    let mut record = SquashRecord::new(root, base, children, strategy);
    record.message = commit_subject(repo, root);
    for child in &mut record.children {
        child.message = commit_subject(repo, &child.hash);
    }
    record.validate()?;

    let json = record.to_json_pretty()?;
    add_note(repo, &settings.notes_ref, root, &json)?;
    info!(root, children = children.len(), strategy, "squash metadata written");

    let root_full = full_hash(repo, root)?;
    let children_full = children
        .iter()
        .map(|c| full_hash(repo, c))
        .collect::<Result<Vec<_>>>()?;
    create_preservation_refs(repo, settings, &root_full, &children_full)?;
    Ok(record)
}

fn add_note(repo: &Path, notes_ref: &str, target: &str, body: &str) -> Result<()> {
    debug!(repo = %repo.display(), notes_ref, target, "git notes add");
    let mut child = Command::new("git")
        .args(["notes", "--ref", notes_ref, "add", "-F", "-", target])
        .current_dir(repo)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawning git notes add")?;
    child
        .stdin
        .take()
        .context("git notes add: stdin unavailable")?
        .write_all(body.as_bytes())?;
    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git notes add {target} failed: {}", stderr.trim());
    }
    Ok(())
}
