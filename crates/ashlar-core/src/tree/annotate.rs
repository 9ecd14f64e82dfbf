//! The annotation pass
//!
//! One pre-order, depth-first walk over the forest, left-to-right through
//! siblings. For each node it validates fail-fast, assigns identity (fresh
//! unless the builder carried one over), sets parent and depth, records
//! sibling position and count, numbers the node into the total visiting
//! order, and links `prev`/`next` along that order — the order keyboard
//! navigation follows, descent into children included.
//!
//! Hashing runs strictly bottom-up: the visit list is replayed in reverse,
//! which reaches every child before its parent, so a node's digest can read
//! its children's finished digests directly.
//!
//! A malformed node aborts the pass before it touches the identity maps or
//! the hash table; downstream consumers can therefore treat "equal hash"
//! as "equal structure" without re-checking shape.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::error::TreeError;
use crate::tree::arena::Tree;
use crate::tree::node::{NodeId, NodeUid};

impl Tree {
    pub(crate) fn annotate(&mut self) -> Result<(), TreeError> {
        self.by_uid.clear();
        self.by_nid.clear();

        let mut order: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        let mut seen = vec![false; self.nodes.len()];
        let roots = self.roots.clone();
        self.visit_group(None, 1, &roots, &mut order, &mut seen)?;

        for i in 1..order.len() {
            let (before, after) = (order[i - 1], order[i]);
            self.nodes[before.index()].meta.next = Some(after);
            self.nodes[after.index()].meta.prev = Some(before);
        }

        // Reverse pre-order reaches every child before its parent.
        let mut hashes = vec![0u64; self.nodes.len()];
        let vocab = Arc::clone(&self.vocab);
        for &id in order.iter().rev() {
            let node = &self.nodes[id.index()];
            // Registration was checked during the pre-order visit.
            if let Some(spec) = vocab.spec_of(node.kind()) {
                hashes[id.index()] = spec.hash_node(node, |child| hashes[child.index()]);
            }
        }
        for &id in &order {
            self.nodes[id.index()].meta.hash = Some(hashes[id.index()]);
        }

        let mut aggregate = DefaultHasher::new();
        self.roots.len().hash(&mut aggregate);
        for root in &self.roots {
            hashes[root.index()].hash(&mut aggregate);
        }
        self.hash = aggregate.finish();

        debug!(
            nodes = order.len(),
            roots = self.roots.len(),
            hash = self.hash,
            "annotated tree"
        );
        Ok(())
    }

    /// Visit one sibling group, then each member's children, in order.
    fn visit_group(
        &mut self,
        parent: Option<NodeId>,
        level: u32,
        group: &[NodeId],
        order: &mut Vec<NodeId>,
        seen: &mut [bool],
    ) -> Result<(), TreeError> {
        let count = group.len() as u32;
        for (index, &id) in group.iter().enumerate() {
            if seen[id.index()] {
                return Err(TreeError::DuplicateChild { id });
            }
            seen[id.index()] = true;

            self.validate_node(id)?;

            let uid = match self.nodes[id.index()].meta.uid {
                Some(carried) => carried,
                None => NodeUid::fresh(),
            };
            if self.by_uid.insert(uid, id).is_some() {
                return Err(TreeError::DuplicateUid { uid });
            }

            let nid = order.len() as u32;
            let meta = &mut self.nodes[id.index()].meta;
            meta.uid = Some(uid);
            meta.nid = Some(nid);
            meta.level = Some(level);
            meta.parent = parent;
            meta.prev = None;
            meta.next = None;
            meta.hash = None;
            meta.sibling_index = Some(index as u32 + 1);
            meta.sibling_count = Some(count);
            order.push(id);
            self.by_nid.push(id);

            let children: Vec<NodeId> = {
                let node = &self.nodes[id.index()];
                match self.vocab.spec_of(node.kind()) {
                    Some(spec) => spec.children(node).collect(),
                    None => Vec::new(),
                }
            };
            self.visit_group(Some(id), level + 1, &children, order, seen)?;
        }
        Ok(())
    }

    /// Fail-fast structural checks, run before any metadata is assigned.
    fn validate_node(&self, id: NodeId) -> Result<(), TreeError> {
        let node = &self.nodes[id.index()];
        let kind = node.kind();

        if !node.span().is_well_formed() {
            return Err(TreeError::InvalidSpan {
                kind,
                span: node.span(),
            });
        }
        if let Some(comment) = &node.options().comment {
            if !comment.span.is_well_formed() {
                return Err(TreeError::InvalidSpan {
                    kind,
                    span: comment.span,
                });
            }
        }

        let Some(registered) = self.vocab.get(kind) else {
            return Err(TreeError::UnknownKind { kind });
        };
        registered.spec().validate(node)?;

        for (field, fvalue) in node.fields() {
            for child in fvalue.child_ids() {
                if child.index() >= self.nodes.len() {
                    return Err(TreeError::DanglingChild { kind, field });
                }
            }
        }
        Ok(())
    }
}
