//! ashlar-core
//!
//! Core tree model and pretty-printer for the ashlar block editor, which
//! lets a user edit program source simultaneously as plain text and as a
//! tree of draggable, navigable blocks. The surrounding editor re-parses
//! the full text on every edit; this crate provides everything that makes
//! those throwaway parses usable as a UI substrate:
//!
//! - [`tree`] — the node/forest data model: declarative per-kind schemas,
//!   a single annotation pass assigning identity, hierarchy, total
//!   visiting order, and a bottom-up structural hash, plus the navigation
//!   queries keyboard and cursor interaction need.
//! - [`doc`] — the layout document algebra and one-pass renderer used to
//!   regenerate deterministically formatted source text.
//! - [`testing`] — a miniature fixture language for assembling trees in
//!   tests.
//!
//! Parsers, rendering, the text buffer, and old/new-tree reconciliation
//! live outside this crate; the contract they rely on is that a finished
//! [`tree::Tree`] is fully annotated, fail-fast validated, and hashed
//! purely structurally.

pub mod doc;
pub mod error;
pub mod testing;
pub mod tree;

// Re-export commonly used types
pub use doc::{Doc, PrintOptions, concat, horz, if_flat, sep_by, txt, vert, with_comment};
pub use error::TreeError;
pub use tree::{
    Comment, FieldKind, FieldSpec, FieldValue, Node, NodeId, NodeKind, NodeSpec, NodeUid,
    Position, Span, Tree, TreeBuilder, Vocabulary, list, optional, required, value,
};
