//! Nodes, identity, and the options bag
//!
//! A [`Node`] is one block in the forest: a kind tag resolving to a
//! registered spec, a source span, the open-ended field table the spec
//! describes, and a small options bag (an optional attached comment plus
//! presentation metadata). Annotation metadata lives in a separate
//! [`NodeMeta`] struct the node *contains*, so a parser-supplied field can
//! never collide with it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::tree::pos::Span;

/// Arena index of a node within its owning [`crate::tree::Tree`].
///
/// Ids are only meaningful inside the tree (or builder) that allocated
/// them; indexing another tree with them is a logic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque node identity.
///
/// Assigned once during annotation and never mutated afterwards. A uid
/// survives a reparse only when an external reconciliation step carries it
/// onto the replacement node via
/// [`crate::tree::TreeBuilder::alloc_with_uid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeUid(pub(crate) u64);

impl NodeUid {
    /// Draw a fresh process-unique identity.
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A comment attached to a node.
///
/// Comments are not tree nodes: they are excluded from child iteration and
/// the visiting order, but their span extends the owner's full source range
/// and their text participates in the owner's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

impl Comment {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// The options bag: one reserved comment slot plus presentation metadata.
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    /// Attached comment, if any
    pub comment: Option<Comment>,
    /// Presentation metadata, e.g. an accessibility label under
    /// `"aria-label"`
    pub meta: IndexMap<String, Value>,
}

impl NodeOptions {
    /// The accessibility label, when present.
    pub fn aria_label(&self) -> Option<&str> {
        self.meta.get("aria-label").and_then(Value::as_str)
    }
}

/// Runtime value of one declared field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A required child
    Child(NodeId),
    /// An optional child
    MaybeChild(Option<NodeId>),
    /// An ordered child list
    Children(Vec<NodeId>),
    /// An opaque leaf datum
    Datum(Value),
}

impl FieldValue {
    /// Human-readable shape name, used by validation errors.
    pub(crate) fn shape_name(&self) -> &'static str {
        match self {
            FieldValue::Child(_) => "required child",
            FieldValue::MaybeChild(_) => "optional child",
            FieldValue::Children(_) => "child list",
            FieldValue::Datum(_) => "opaque",
        }
    }

    /// Every child id this value contributes.
    pub(crate) fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let (one, many): (Option<NodeId>, &[NodeId]) = match self {
            FieldValue::Child(id) => (Some(*id), &[]),
            FieldValue::MaybeChild(id) => (*id, &[]),
            FieldValue::Children(ids) => (None, ids.as_slice()),
            FieldValue::Datum(_) => (None, &[]),
        };
        one.into_iter().chain(many.iter().copied())
    }
}

/// Annotation metadata, fully recomputed by every annotation pass.
///
/// All fields are `None` until the owning tree's annotation completes;
/// reading them earlier is unsupported. Keeping the metadata in a struct
/// the node contains (rather than inherits) makes a collision between a
/// parser-declared field and these names structurally impossible.
#[derive(Debug, Clone, Default)]
pub struct NodeMeta {
    pub(crate) uid: Option<NodeUid>,
    pub(crate) nid: Option<u32>,
    pub(crate) level: Option<u32>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) hash: Option<u64>,
    pub(crate) sibling_index: Option<u32>,
    pub(crate) sibling_count: Option<u32>,
}

/// One block in the forest.
#[derive(Debug, Clone)]
pub struct Node {
    kind: &'static str,
    span: Span,
    options: NodeOptions,
    fields: IndexMap<&'static str, FieldValue>,
    pub(crate) meta: NodeMeta,
}

impl Node {
    pub fn new(kind: &'static str, span: Span) -> Self {
        Self {
            kind,
            span,
            options: NodeOptions::default(),
            fields: IndexMap::new(),
            meta: NodeMeta::default(),
        }
    }

    // Builder-style field setters, used by parsers while assembling a node.

    pub fn child(mut self, name: &'static str, id: NodeId) -> Self {
        self.fields.insert(name, FieldValue::Child(id));
        self
    }

    pub fn maybe_child(mut self, name: &'static str, id: Option<NodeId>) -> Self {
        self.fields.insert(name, FieldValue::MaybeChild(id));
        self
    }

    pub fn children(mut self, name: &'static str, ids: Vec<NodeId>) -> Self {
        self.fields.insert(name, FieldValue::Children(ids));
        self
    }

    pub fn datum(mut self, name: &'static str, datum: impl Into<Value>) -> Self {
        self.fields.insert(name, FieldValue::Datum(datum.into()));
        self
    }

    pub fn comment(mut self, comment: Comment) -> Self {
        self.options.comment = Some(comment);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.options
            .meta
            .insert("aria-label".to_owned(), Value::String(label.into()));
        self
    }

    // Structural accessors.

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The full source range, extended over the attached comment's span.
    pub fn src_span(&self) -> Span {
        match &self.options.comment {
            Some(comment) => self.span.cover(&comment.span),
            None => self.span,
        }
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// The single child under `name`, for required or present-optional
    /// fields.
    pub fn child_of(&self, name: &str) -> Option<NodeId> {
        match self.fields.get(name) {
            Some(FieldValue::Child(id)) => Some(*id),
            Some(FieldValue::MaybeChild(id)) => *id,
            _ => None,
        }
    }

    /// The child list under `name`, empty for anything but a list field.
    pub fn children_of(&self, name: &str) -> &[NodeId] {
        match self.fields.get(name) {
            Some(FieldValue::Children(ids)) => ids,
            _ => &[],
        }
    }

    /// The opaque datum under `name`.
    pub fn datum_of(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(FieldValue::Datum(datum)) => Some(datum),
            _ => None,
        }
    }

    // Annotation metadata. All `None` before the owning tree's annotation
    // pass completes.

    pub fn uid(&self) -> Option<NodeUid> {
        self.meta.uid
    }

    pub fn nid(&self) -> Option<u32> {
        self.meta.nid
    }

    pub fn level(&self) -> Option<u32> {
        self.meta.level
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.meta.parent
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.meta.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.meta.next
    }

    pub fn hash(&self) -> Option<u64> {
        self.meta.hash
    }

    /// 1-based position among this node's siblings.
    pub fn sibling_index(&self) -> Option<u32> {
        self.meta.sibling_index
    }

    pub fn sibling_count(&self) -> Option<u32> {
        self.meta.sibling_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::pos::{Position, Span};
    use serde_json::json;

    #[test]
    fn fresh_uids_never_repeat() {
        let a = NodeUid::fresh();
        let b = NodeUid::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn src_span_covers_the_attached_comment() {
        let node = Node::new("lit", Span::at(0, 0, 0, 1))
            .comment(Comment::new(Span::at(0, 3, 0, 12), "; trailing"));
        assert_eq!(node.src_span(), Span::at(0, 0, 0, 12));
        assert_eq!(node.span(), Span::at(0, 0, 0, 1));
    }

    #[test]
    fn metadata_is_unset_before_annotation() {
        let node = Node::new("lit", Span::at(0, 0, 0, 1)).datum("value", json!(1));
        assert_eq!(node.uid(), None);
        assert_eq!(node.nid(), None);
        assert_eq!(node.hash(), None);
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn label_lands_in_the_metadata_map() {
        let node = Node::new("lit", Span::at(0, 0, 0, 1)).label("the number one");
        assert_eq!(node.options().aria_label(), Some("the number one"));
        assert!(node.span().contains(Position::new(0, 0)));
    }
}
