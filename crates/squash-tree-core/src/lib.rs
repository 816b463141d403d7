pub mod record;
pub mod render;
pub mod resolve;

pub use record::{ChildRef, SchemaError, SquashRecord, SPEC_VERSION_V1, TYPE_SQUASH};
pub use render::{render, render_detailed, EMPTY_TREE};
pub use resolve::{build_tree, ResolveError, SourceError, SquashSource, TreeNode};
