use crate::record::SquashRecord;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Error type providers use to report a failed metadata read.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Answers existence and metadata queries for commit identifiers.
///
/// Implemented by the git notes reader; tests use an in-memory double.
pub trait SquashSource {
    fn commit_exists(&self, id: &str) -> bool;

    fn has_metadata(&self, id: &str) -> bool;

    fn read_metadata(&self, id: &str) -> Result<SquashRecord, SourceError>;

    /// One-line summary of the commit itself, when the provider can supply it.
    fn commit_subject(&self, _id: &str) -> Option<String> {
        None
    }
}

/// A node of the resolved squash tree.
///
/// A commit reachable through several squashes is resolved once; every
/// position it occupies holds the same `Rc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A commit with no squash record.
    Leaf { id: String, message: Option<String> },
    /// A commit whose squash record was expanded into `children`, ordered by
    /// the record's `order` values.
    Squash {
        id: String,
        message: Option<String>,
        record: SquashRecord,
        children: Vec<Rc<TreeNode>>,
    },
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Leaf { id, .. } | TreeNode::Squash { id, .. } => id,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            TreeNode::Leaf { message, .. } | TreeNode::Squash { message, .. } => {
                message.as_deref()
            }
        }
    }

    pub fn is_squash(&self) -> bool {
        matches!(self, TreeNode::Squash { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn record(&self) -> Option<&SquashRecord> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Squash { record, .. } => Some(record),
        }
    }

    pub fn children(&self) -> &[Rc<TreeNode>] {
        match self {
            TreeNode::Leaf { .. } => &[],
            TreeNode::Squash { children, .. } => children,
        }
    }
}

/// Why a tree could not be built. Any of these aborts the whole build.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("commit {id} does not exist")]
    UnresolvedCommit { id: String },

    #[error("failed to read metadata for {id}: {source}")]
    MetadataRead {
        id: String,
        #[source]
        source: SourceError,
    },

    #[error("cycle detected: commit {id} is part of a cycle ({})", path.join(" -> "))]
    Cycle { id: String, path: Vec<String> },
}

/// Resolve `start` and everything its squash records reference into a tree.
///
/// Each distinct identifier is queried at most once. A record that leads back
/// to a commit still being expanded fails with [`ResolveError::Cycle`].
pub fn build_tree<S>(start: &str, source: &S) -> Result<Rc<TreeNode>, ResolveError>
where
    S: SquashSource + ?Sized,
{
    let mut resolver = Resolver {
        source,
        memo: HashMap::new(),
        expanding: Vec::new(),
    };
    let root = resolver.resolve(start, None)?;
    debug!(
        root = start,
        distinct = resolver.memo.len(),
        "squash tree resolved"
    );
    Ok(root)
}

/// Per-call resolution state: finished nodes by id, and the chain of squash
/// ids currently being expanded (root first).
struct Resolver<'a, S: ?Sized> {
    source: &'a S,
    memo: HashMap<String, Rc<TreeNode>>,
    expanding: Vec<String>,
}

impl<S: SquashSource + ?Sized> Resolver<'_, S> {
    fn resolve(&mut self, id: &str, hint: Option<&str>) -> Result<Rc<TreeNode>, ResolveError> {
        if let Some(pos) = self.expanding.iter().position(|active| active == id) {
            let mut path = self.expanding[pos..].to_vec();
            path.push(id.to_string());
            tracing::warn!(commit = id, path = %path.join(" -> "), "squash cycle rejected");
            return Err(ResolveError::Cycle {
                id: id.to_string(),
                path,
            });
        }
        if let Some(node) = self.memo.get(id) {
            debug!(commit = id, "reusing resolved node");
            return Ok(Rc::clone(node));
        }
        if !self.source.commit_exists(id) {
            return Err(ResolveError::UnresolvedCommit { id: id.to_string() });
        }

        let subject = self.source.commit_subject(id);
        let node = if self.source.has_metadata(id) {
            self.expand(id, subject, hint)?
        } else {
            debug!(commit = id, "leaf");
            TreeNode::Leaf {
                id: id.to_string(),
                message: subject.or_else(|| hint.map(str::to_string)),
            }
        };

        let node = Rc::new(node);
        self.memo.insert(id.to_string(), Rc::clone(&node));
        Ok(node)
    }

    fn expand(
        &mut self,
        id: &str,
        subject: Option<String>,
        hint: Option<&str>,
    ) -> Result<TreeNode, ResolveError> {
        let record = self
            .source
            .read_metadata(id)
            .map_err(|source| ResolveError::MetadataRead {
                id: id.to_string(),
                source,
            })?;
        debug!(commit = id, children = record.children.len(), "expanding squash");

        self.expanding.push(id.to_string());
        let mut children = Vec::with_capacity(record.children.len());
        for child in record.sorted_children() {
            children.push(self.resolve(&child.hash, child.message.as_deref())?);
        }
        self.expanding.pop();

        let message = subject
            .or_else(|| record.message.clone())
            .or_else(|| hint.map(str::to_string));
        Ok(TreeNode::Squash {
            id: id.to_string(),
            message,
            record,
            children,
        })
    }
}
