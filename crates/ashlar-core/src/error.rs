//! Error types for tree construction and validation

use thiserror::Error;

use crate::tree::{FieldKind, NodeId, NodeUid, Span};

/// Structural errors raised while declaring node specs or annotating a tree.
///
/// Every variant represents a programming error in a parser or node-kind
/// definition, not recoverable user input. Annotation fails fast: a node
/// that produces one of these never reaches the identity maps or the hash
/// pass.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A spec declared a field under a name reserved for annotation metadata
    #[error("field name `{field}` is reserved for annotation metadata")]
    ReservedField { field: &'static str },

    /// A spec declared the same field twice
    #[error("duplicate field `{field}` in node spec")]
    DuplicateField { field: &'static str },

    /// Two node kinds were registered under the same name
    #[error("node kind `{kind}` is already registered")]
    DuplicateKind { kind: &'static str },

    /// A node's kind tag does not resolve to any registered spec
    #[error("unknown node kind `{kind}`")]
    UnknownKind { kind: &'static str },

    /// A declared field is absent from the node's field table
    #[error("node kind `{kind}` is missing declared field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    /// A field's runtime value does not match its declared kind
    #[error("node kind `{kind}` field `{field}`: expected {expected} value, found {found}")]
    FieldMismatch {
        kind: &'static str,
        field: &'static str,
        expected: FieldKind,
        found: &'static str,
    },

    /// The node carries a field its spec never declared
    #[error("node kind `{kind}` carries undeclared field `{field}`")]
    UndeclaredField {
        kind: &'static str,
        field: &'static str,
    },

    /// A node's source span runs backwards
    #[error("node kind `{kind}` has an invalid span {span}")]
    InvalidSpan { kind: &'static str, span: Span },

    /// A field references an id never allocated through the builder
    #[error("node kind `{kind}` field `{field}` references a node outside this tree")]
    DanglingChild {
        kind: &'static str,
        field: &'static str,
    },

    /// The root list references an id never allocated through the builder
    #[error("root list references a node outside this tree")]
    InvalidRoot,

    /// One allocation is attached at more than one place in the forest
    #[error("node {id:?} is attached at more than one place in the tree")]
    DuplicateChild { id: NodeId },

    /// The same carried-over identity landed on two nodes
    #[error("identity {uid} was carried over onto more than one node")]
    DuplicateUid { uid: NodeUid },
}
