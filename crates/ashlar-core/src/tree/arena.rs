//! Tree container: the arena, identity maps, and basic queries
//!
//! A [`Tree`] owns the forest for one parse/serialize cycle. Nodes live in
//! an arena indexed by [`NodeId`]; the `uid → node` and `nid → node` maps
//! are scoped to the owning tree, so successive trees never collide even
//! though `nid` numbering restarts at zero each pass.
//!
//! A parser assembles nodes through a [`TreeBuilder`] and calls
//! [`TreeBuilder::finish`], which sorts the roots by source position and
//! runs the annotation pass. The finished tree is effectively immutable:
//! mutating nodes without re-annotating would leave hashes and navigation
//! links stale, and no API for doing so is exposed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TreeError;
use crate::tree::node::{Node, NodeId, NodeUid};
use crate::tree::pos::Span;
use crate::tree::spec::Vocabulary;

/// The root container: ordered roots, arena, and per-tree lookup maps.
#[derive(Debug)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) vocab: Arc<Vocabulary>,
    pub(crate) by_uid: HashMap<NodeUid, NodeId>,
    pub(crate) by_nid: Vec<NodeId>,
    pub(crate) hash: u64,
}

/// Arena-backed construction surface handed to parsers.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    vocab: Arc<Vocabulary>,
}

impl TreeBuilder {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self {
            nodes: Vec::new(),
            vocab,
        }
    }

    /// Allocate `node` into the arena and return its id.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate `node` carrying an identity from a previous tree.
    ///
    /// This is the splice point for an external reconciliation step: a new
    /// node allocated this way keeps `uid` through annotation instead of
    /// drawing a fresh one.
    pub fn alloc_with_uid(&mut self, node: Node, uid: NodeUid) -> NodeId {
        let id = self.alloc(node);
        self.nodes[id.index()].meta.uid = Some(uid);
        id
    }

    /// Sort `roots` by source position, annotate, and produce the tree.
    ///
    /// Fails on the first malformed node; nothing from a failed finish is
    /// observable.
    pub fn finish(self, mut roots: Vec<NodeId>) -> Result<Tree, TreeError> {
        for root in &roots {
            if root.index() >= self.nodes.len() {
                return Err(TreeError::InvalidRoot);
            }
        }
        roots.sort_by_key(|id| self.nodes[id.index()].span().from);
        let mut tree = Tree {
            nodes: self.nodes,
            roots,
            vocab: self.vocab,
            by_uid: HashMap::new(),
            by_nid: Vec::new(),
            hash: 0,
        };
        tree.annotate()?;
        Ok(tree)
    }

    /// Produce a tree without running annotation. Test fixtures only:
    /// identity, navigation, and hash metadata stay unset.
    pub fn finish_unannotated(self, roots: Vec<NodeId>) -> Tree {
        Tree {
            nodes: self.nodes,
            roots,
            vocab: self.vocab,
            by_uid: HashMap::new(),
            by_nid: Vec::new(),
            hash: 0,
        }
    }
}

impl Tree {
    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was allocated by a different tree's builder and is
    /// out of range here.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Root ids, sorted by source position.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Aggregate structural hash over all roots.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of annotated nodes.
    pub fn len(&self) -> usize {
        self.by_nid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_nid.is_empty()
    }

    pub fn node_by_uid(&self, uid: NodeUid) -> Option<NodeId> {
        self.by_uid.get(&uid).copied()
    }

    pub fn node_by_nid(&self, nid: u32) -> Option<NodeId> {
        self.by_nid.get(nid as usize).copied()
    }

    /// Every annotated node, in total visiting order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_nid.iter().copied()
    }

    /// `id`'s children in declared field order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let node = self.node(id);
        self.vocab
            .spec_of(node.kind())
            .into_iter()
            .flat_map(move |spec| spec.children(node))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    /// The node immediately after `id` in total visiting order.
    pub fn node_after(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next()
    }

    /// The node immediately before `id` in total visiting order.
    pub fn node_before(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev()
    }

    /// Full source range of `id`, attached comment included.
    pub fn src_span(&self, id: NodeId) -> Span {
        self.node(id).src_span()
    }

    /// Strict ancestry test: whether `ancestor` lies on `descendant`'s
    /// parent chain.
    ///
    /// Uses `level` to skip straight up to the candidate's depth before
    /// comparing.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let (Some(target), Some(mut level)) = (
            self.node(ancestor).level(),
            self.node(descendant).level(),
        ) else {
            return false;
        };
        let mut cursor = descendant;
        while level > target {
            match self.node(cursor).parent() {
                Some(parent) => {
                    cursor = parent;
                    level -= 1;
                }
                None => return false,
            }
        }
        cursor == ancestor
    }
}
