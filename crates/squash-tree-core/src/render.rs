use crate::resolve::TreeNode;

/// Output for an absent tree.
pub const EMPTY_TREE: &str = "(empty tree)";

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

#[derive(Clone, Copy)]
enum Position {
    Root,
    Middle,
    Last,
}

/// Render a tree as an indented connector diagram, one line per node.
pub fn render(root: Option<&TreeNode>) -> String {
    let Some(root) = root else {
        return EMPTY_TREE.to_string();
    };
    let mut out = String::new();
    render_node(&mut out, root, "", Position::Root, false);
    out
}

/// Like [`render`], with a header, squash base/strategy and commit messages.
pub fn render_detailed(root: Option<&TreeNode>) -> String {
    let Some(root) = root else {
        return EMPTY_TREE.to_string();
    };
    let mut out = String::from("Squash Tree:\n============\n\n");
    render_node(&mut out, root, "", Position::Root, true);
    out
}

fn render_node(out: &mut String, node: &TreeNode, prefix: &str, position: Position, details: bool) {
    let connector = match position {
        Position::Root => "",
        Position::Middle => BRANCH,
        Position::Last => CORNER,
    };
    out.push_str(prefix);
    out.push_str(connector);
    push_label(out, node, details);
    out.push('\n');

    let child_prefix = match position {
        Position::Root => prefix.to_string(),
        Position::Middle => format!("{prefix}{PIPE}"),
        Position::Last => format!("{prefix}{BLANK}"),
    };
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let position = if i + 1 == children.len() {
            Position::Last
        } else {
            Position::Middle
        };
        render_node(out, child, &child_prefix, position, details);
    }
}

fn push_label(out: &mut String, node: &TreeNode, details: bool) {
    out.push_str(node.id());
    match node {
        TreeNode::Leaf { .. } => out.push_str(" [LEAF]"),
        TreeNode::Squash { record, .. } => {
            out.push_str(" [SQUASH]");
            if details {
                out.push_str(&format!(" base:{} strategy:{}", record.base_id, record.strategy));
            }
        }
    }
    if details {
        if let Some(message) = node.message() {
            out.push_str(&format!(" - {}", first_line(message)));
        }
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim_end()
}
