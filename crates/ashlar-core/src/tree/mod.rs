//! The block tree: nodes, schemas, identity, and navigation
//!
//! This module implements the data model behind the dual text/block
//! editing surface. An external parser rebuilds the forest on every edit;
//! the tree's one annotation pass then assigns everything the UI layers
//! need:
//!
//! - **Identity**: a [`NodeUid`] per node, fresh unless carried over from
//!   a previous tree by an external reconciliation step.
//! - **Hierarchy**: parent links, depth (roots at level 1), and 1-based
//!   sibling position/count for accessibility announcements.
//! - **Linear order**: a per-pass `nid` and `prev`/`next` links along the
//!   total visiting order, which is what keyboard up/down follows.
//! - **Structure hash**: a bottom-up digest over each node's kind,
//!   spec-declared fields, and attached comment, so unchanged subtrees can
//!   be recognized cheaply across a reparse.
//!
//! Node shapes are declared once per kind as a [`NodeSpec`] in a
//! [`Vocabulary`]; validation, child iteration, and hashing all derive
//! from the declaration. Validation is fail-fast: a malformed node aborts
//! annotation before it can reach the identity maps or corrupt a hash.

mod annotate;
mod arena;
mod navigate;
mod node;
mod pos;
mod source;
mod spec;

pub use arena::{Tree, TreeBuilder};
pub use node::{Comment, FieldValue, Node, NodeId, NodeMeta, NodeOptions, NodeUid};
pub use pos::{Position, Span};
pub use spec::{
    FieldKind, FieldSpec, NodeKind, NodeSpec, PrettyFn, RESERVED_FIELDS, Vocabulary, list,
    optional, required, value,
};
