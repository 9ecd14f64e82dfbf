//! Position-based navigation queries
//!
//! These let a raw text cursor snap to the block structure: descend from
//! the roots toward the position, at each level picking the node adjacent
//! to (or containing) it, until a leaf or an exact boundary match. All
//! queries return sentinels rather than erroring — "nothing there" is a
//! routine outcome after an edit.
//!
//! The comment-adjacency scans are linear over the annotated nodes, which
//! is fine at interactive call rates.

use crate::tree::arena::Tree;
use crate::tree::node::NodeId;
use crate::tree::pos::{Position, Span};

impl Tree {
    /// The nearest node starting at or after `pos`.
    ///
    /// An exact start-boundary match wins immediately; otherwise the
    /// descent recurses into whichever node surrounds `pos` and falls back
    /// to the closest following node seen on the way down.
    pub fn node_after_cursor(&self, pos: Position) -> Option<NodeId> {
        let mut group: Vec<NodeId> = self.roots.clone();
        let mut best: Option<NodeId> = None;
        loop {
            let following = group
                .iter()
                .copied()
                .find(|&id| self.node(id).span().from >= pos);
            if let Some(id) = following {
                if self.node(id).span().from == pos {
                    return Some(id);
                }
                best = Some(id);
            }
            let surrounding = group.iter().copied().find(|&id| {
                let span = self.node(id).span();
                span.from < pos && pos < span.to
            });
            match surrounding {
                Some(id) => group = self.children(id).collect(),
                None => return best,
            }
        }
    }

    /// The nearest node ending at or before `pos`; mirror of
    /// [`Tree::node_after_cursor`].
    pub fn node_before_cursor(&self, pos: Position) -> Option<NodeId> {
        let mut group: Vec<NodeId> = self.roots.clone();
        let mut best: Option<NodeId> = None;
        loop {
            let preceding = group
                .iter()
                .copied()
                .rev()
                .find(|&id| self.node(id).span().to <= pos);
            if let Some(id) = preceding {
                if self.node(id).span().to == pos {
                    return Some(id);
                }
                best = Some(id);
            }
            let surrounding = group.iter().copied().find(|&id| {
                let span = self.node(id).span();
                span.from < pos && pos < span.to
            });
            match surrounding {
                Some(id) => group = self.children(id).collect(),
                None => return best,
            }
        }
    }

    /// The innermost node whose full source range (attached comment
    /// included) contains `pos`.
    pub fn node_containing(&self, pos: Position) -> Option<NodeId> {
        let mut group: Vec<NodeId> = self.roots.clone();
        let mut found: Option<NodeId> = None;
        loop {
            let hit = group
                .iter()
                .copied()
                .find(|&id| self.node(id).src_span().contains(pos));
            match hit {
                Some(id) => {
                    found = Some(id);
                    group = self.children(id).collect();
                }
                None => return found,
            }
        }
    }

    /// The node whose span — plain or comment-inclusive — is exactly
    /// `from..to`.
    pub fn node_at(&self, from: Position, to: Position) -> Option<NodeId> {
        let target = Span::new(from, to);
        self.nodes().find(|&id| {
            let node = self.node(id);
            node.span() == target || node.src_span() == target
        })
    }

    /// Whether a comment, or a node carrying one, sits immediately left of
    /// `pos` on the same line.
    ///
    /// Callers use this to decide whether an insertion at `pos` needs
    /// separating whitespace so it cannot merge into the comment.
    pub fn follows_comment(&self, pos: Position) -> bool {
        self.nodes().any(|id| {
            let node = self.node(id);
            let Some(comment) = &node.options().comment else {
                return false;
            };
            (comment.span.to.line == pos.line && comment.span.to.ch <= pos.ch)
                || (node.span().to.line == pos.line && node.span().to.ch <= pos.ch)
        })
    }

    /// Whether a comment, or a node carrying one, sits immediately right
    /// of `pos` on the same line.
    pub fn precedes_comment(&self, pos: Position) -> bool {
        self.nodes().any(|id| {
            let node = self.node(id);
            let Some(comment) = &node.options().comment else {
                return false;
            };
            (comment.span.from.line == pos.line && pos.ch <= comment.span.from.ch)
                || (node.span().from.line == pos.line && pos.ch <= node.span().from.ch)
        })
    }
}
