/*!
 * Project tree: construction from a flat path list, visibility and selection
 *
 * Nodes live in an arena owned by [`Tree`]; parents and children refer to
 * each other by [`NodeId`]. The tree is built once by [`TreeBuilder`] and
 * afterwards only the `expanded` and `selected` flags change.
 */

use std::collections::HashMap;

use log::debug;

use crate::bail;
use crate::error::Result;
use crate::types::{Node, NodeId, NodeKind};

/// Directories with more immediate children than this start collapsed
pub const DEFAULT_EXPAND_LIMIT: usize = 32;

/// Prefix meaning "the whole base directory"
pub const ROOT_PREFIX: &str = ".";

/// Join a parent path and a segment, treating the root prefix as empty
fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PREFIX || parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Arena-backed directory/file tree
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Id of the root directory
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists even for an empty listing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visible sequence: pre-order traversal that descends only into
    /// expanded directories. Directories themselves are always included.
    pub fn flatten(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];

        while let Some(id) = stack.pop() {
            out.push(id);
            let node = self.node(id);
            if node.is_dir() && node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        out
    }

    /// Position of `id` in `sequence`, falling back to the first entry
    pub fn locate(sequence: &[NodeId], id: NodeId) -> usize {
        sequence.iter().position(|&n| n == id).unwrap_or(0)
    }

    /// Set a directory's expansion flag. Files are left untouched.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        let node = &mut self.nodes[id.0];
        if node.is_dir() {
            node.expanded = expanded;
        }
    }

    /// Flip a file's selection flag and return the new value.
    /// Directories are never selected.
    pub fn toggle_selected(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        if node.is_dir() {
            return false;
        }
        node.selected = !node.selected;
        node.selected
    }

    /// Paths of every selected file, sorted lexicographically
    pub fn selected_paths(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !n.is_dir() && n.selected)
            .map(|n| n.path.clone())
            .collect();
        out.sort();
        out
    }
}

/// Incrementally builds a [`Tree`] from base-relative file paths
pub struct TreeBuilder {
    /// Start prefix, `"."` for the whole base
    prefix: String,
    /// Arena under construction
    nodes: Vec<Node>,
    /// Children of each directory by name
    lookup: HashMap<NodeId, HashMap<String, NodeId>>,
    /// Expansion threshold applied when finishing
    expand_limit: usize,
}

impl TreeBuilder {
    /// Create a builder whose root represents `prefix`
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let prefix = if prefix.is_empty() { ROOT_PREFIX } else { prefix };

        let root = Node::new(
            prefix.to_string(),
            prefix.to_string(),
            NodeKind::Directory,
            None,
            0,
        );

        Self {
            prefix: prefix.to_string(),
            nodes: vec![root],
            lookup: HashMap::new(),
            expand_limit: DEFAULT_EXPAND_LIMIT,
        }
    }

    /// Override the default expansion threshold
    pub fn expand_limit(mut self, limit: usize) -> Self {
        self.expand_limit = limit;
        self
    }

    /// Insert one base-relative, slash-separated file path
    pub fn insert(&mut self, path: &str) -> Result<()> {
        let within = if self.prefix == ROOT_PREFIX {
            path
        } else {
            match path
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest,
                None => {
                    debug!("Skipping {} outside of {}", path, self.prefix);
                    return Ok(());
                }
            }
        };

        let segments: Vec<&str> = within.split('/').collect();
        let (leaf, dirs) = match segments.split_last() {
            Some((leaf, dirs)) if !leaf.is_empty() => (*leaf, dirs),
            _ => return Ok(()),
        };

        let mut current = NodeId(0);
        for segment in dirs.iter().filter(|s| !s.is_empty()) {
            current = match self.child(current, segment) {
                Some(id) => {
                    let existing = &self.nodes[id.0];
                    if !existing.is_dir() {
                        bail!(
                            Tree,
                            "{} needs {} to be a directory, but it is a file",
                            path,
                            existing.path
                        );
                    }
                    id
                }
                None => self.push(current, segment, NodeKind::Directory),
            };
        }

        if self.child(current, leaf).is_none() {
            self.push(current, leaf, NodeKind::File);
        }

        Ok(())
    }

    /// Sort every directory (directories first, then by name) and apply
    /// the default expansion state
    pub fn finish(mut self) -> Tree {
        for i in 0..self.nodes.len() {
            if !self.nodes[i].is_dir() {
                continue;
            }

            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by(|&a, &b| {
                let (a, b) = (&self.nodes[a.0], &self.nodes[b.0]);
                b.is_dir()
                    .cmp(&a.is_dir())
                    .then_with(|| a.name.cmp(&b.name))
            });

            let node = &mut self.nodes[i];
            node.expanded = children.len() <= self.expand_limit;
            node.children = children;
        }

        Tree { nodes: self.nodes }
    }

    fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.lookup
            .get(&parent)
            .and_then(|children| children.get(name))
            .copied()
    }

    fn push(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_node = &self.nodes[parent.0];
        let node = Node::new(
            name.to_string(),
            join_path(&parent_node.path, name),
            kind,
            Some(parent),
            parent_node.depth + 1,
        );

        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        self.lookup
            .entry(parent)
            .or_default()
            .insert(name.to_string(), id);

        id
    }
}

/// Build a tree rooted at `prefix` from base-relative file paths
pub fn build_tree<S: AsRef<str>>(prefix: &str, paths: &[S]) -> Result<Tree> {
    let mut builder = TreeBuilder::new(prefix);
    for path in paths {
        builder.insert(path.as_ref())?;
    }
    Ok(builder.finish())
}
