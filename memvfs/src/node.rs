use crate::alloc::BlockId;
use crate::fs::VfsError;

use log::debug;

const ROOT_NAME: &str = "/";

/// A handle to a node in the tree. Handles are only meaningful for the tree that
/// issued them and must not be used after the node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

#[derive(Debug)]
enum Content {
    /// Children in creation order.
    Directory(Vec<NodeId>),
    /// Content blocks in write order.
    File(Vec<BlockId>),
}

#[derive(Debug)]
pub struct Node {
    name: String,
    /// Lookup only, the parent's child list is what owns this node.
    parent: Option<NodeId>,
    content: Content,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>, kind: NodeKind) -> Self {
        let content = match kind {
            NodeKind::Directory => Content::Directory(Vec::new()),
            NodeKind::File => Content::File(Vec::new()),
        };
        Self {
            name,
            parent,
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        match self.content {
            Content::Directory(_) => NodeKind::Directory,
            Content::File(_) => NodeKind::File,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in creation order. Always empty for files.
    pub fn children(&self) -> &[NodeId] {
        match &self.content {
            Content::Directory(children) => children,
            Content::File(_) => &[],
        }
    }

    /// Content blocks in write order. Always empty for directories.
    pub fn blocks(&self) -> &[BlockId] {
        match &self.content {
            Content::File(blocks) => blocks,
            Content::Directory(_) => &[],
        }
    }
}

/// Checks a proposed entry name against the naming rules: non-empty, shorter than
/// `limit` bytes, free of path separators and control characters, and not one of
/// the navigation names `.` and `..`.
pub fn validate_name(name: &str, limit: usize) -> Result<(), VfsError> {
    let invalid = name.is_empty()
        || name.len() >= limit
        || name == "."
        || name == ".."
        || name.chars().any(|c| c == '/' || c.is_control());
    if invalid {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Directories and files organised as a rooted tree.
///
/// Nodes live in an arena and refer to each other through `NodeId` handles, which
/// keeps the parent link a plain lookup key. Slots freed by removal are recycled.
#[derive(Debug)]
pub struct NodeTree {
    nodes: Vec<Option<Node>>,
    vacant: Vec<usize>,
    root: NodeId,
    name_limit: usize,
}

impl NodeTree {
    pub fn new(name_limit: usize) -> Self {
        let root = Node::new(ROOT_NAME.to_string(), None, NodeKind::Directory);
        Self {
            nodes: vec![Some(root)],
            vacant: Vec::new(),
            root: NodeId(0),
            name_limit,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => unreachable!("stale node id {:?}", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => unreachable!("stale node id {:?}", id),
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.vacant.len()
    }

    /// Finds the child of `dir` called `name`.
    pub fn lookup(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.node(dir)
            .children()
            .iter()
            .copied()
            .find(|&child| self.node(child).name == name)
    }

    /// Creates a node under `dir`, appending it to the end of the sibling order.
    pub fn insert(&mut self, dir: NodeId, name: &str, kind: NodeKind) -> Result<NodeId, VfsError> {
        validate_name(name, self.name_limit)?;
        if self.lookup(dir, name).is_some() {
            return Err(VfsError::DuplicateName(name.to_string()));
        }

        let node = Node::new(name.to_string(), Some(dir), kind);
        let id = match self.vacant.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };

        match &mut self.node_mut(dir).content {
            Content::Directory(children) => children.push(id),
            Content::File(_) => unreachable!("inserting below a file node"),
        }
        debug!("Created {:?} node {:?} as {:?}.", kind, name, id);
        Ok(id)
    }

    /// Unlinks a childless node from its parent and hands it back to the caller.
    /// Any blocks the node still holds become the caller's responsibility.
    pub fn remove(&mut self, id: NodeId) -> Node {
        assert!(id != self.root, "the root node cannot be removed");
        assert!(
            self.node(id).children().is_empty(),
            "removing a directory that still has children"
        );

        let parent = self.node(id).parent;
        if let Some(parent) = parent {
            if let Content::Directory(children) = &mut self.node_mut(parent).content {
                children.retain(|&child| child != id);
            }
        }

        let node = match self.nodes[id.0].take() {
            Some(node) => node,
            None => unreachable!("stale node id {:?}", id),
        };
        self.vacant.push(id.0);
        debug!("Removed node {:?} ({:?}).", node.name, id);
        node
    }

    /// Swaps in a new block list for a file, returning the one it replaces.
    pub fn replace_blocks(&mut self, file: NodeId, blocks: Vec<BlockId>) -> Vec<BlockId> {
        match &mut self.node_mut(file).content {
            Content::File(current) => std::mem::replace(current, blocks),
            Content::Directory(_) => unreachable!("replacing blocks of a directory"),
        }
    }

    /// Reconstructs the absolute path of `id` by walking parent links to the root.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            names.push(self.node(cursor).name.as_str());
            cursor = parent;
        }
        if names.is_empty() {
            return ROOT_NAME.to_string();
        }

        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push('/');
            path.push_str(name);
            path
        })
    }

    /// Total number of blocks held by every file in the tree.
    pub fn block_total(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .map(|node| node.blocks().len())
            .sum()
    }

    /// Destroys every node, children before their parent, handing each one to
    /// `visit` as it goes. Returns the number of nodes destroyed.
    ///
    /// Walks with an explicit stack so that deep trees cannot overflow the call
    /// stack.
    pub fn teardown<F: FnMut(Node)>(mut self, mut visit: F) -> usize {
        let mut destroyed = 0;
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                if let Some(node) = self.nodes[id.0].take() {
                    visit(node);
                    destroyed += 1;
                }
                continue;
            }

            stack.push((id, true));
            // Reverse so that siblings are destroyed in creation order.
            for &child in self.node(id).children().iter().rev() {
                stack.push((child, false));
            }
        }
        destroyed
    }
}
