/*!
 * Core types and data structures for mkctx
 */

/// Index of a node inside a [`crate::tree::Tree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Whether a node is a directory or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Directory owning an ordered list of children
    Directory,
    /// Selectable file leaf
    File,
}

/// A directory or file in the project tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Last path segment
    pub name: String,
    /// Slash-separated path relative to the base directory
    pub path: String,
    /// Directory or file
    pub kind: NodeKind,
    /// Distance from the root (root is 0)
    pub depth: usize,
    /// Owning directory, `None` for the root
    pub parent: Option<NodeId>,
    /// Children in display order (directories first, then by name)
    pub children: Vec<NodeId>,
    /// Expansion flag, only meaningful for directories
    pub expanded: bool,
    /// Selection flag, only meaningful for files
    pub selected: bool,
}

impl Node {
    pub(crate) fn new(
        name: String,
        path: String,
        kind: NodeKind,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Self {
        Self {
            name,
            path,
            kind,
            depth,
            parent,
            children: Vec::new(),
            expanded: false,
            selected: false,
        }
    }

    /// True for directory nodes
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Outcome of an interactive session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Still accepting input
    Running,
    /// User quit without building a document
    Aborted,
    /// User asked for the document to be built
    Confirmed,
}

impl Outcome {
    /// True once the session no longer accepts input
    pub fn is_terminal(self) -> bool {
        self != Outcome::Running
    }
}
