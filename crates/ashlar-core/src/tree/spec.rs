//! Node specs: declarative schemas for node kinds
//!
//! A [`NodeSpec`] declares, once per node kind, what each structural field
//! holds: a required child, an optional child, an ordered child list, or an
//! opaque value. Everything generic — validation, child iteration, and the
//! structural hash — derives from that declaration, so wiring up a new node
//! kind is a single registration and a forgotten field becomes a
//! registration-time error instead of a silent hashing bug.
//!
//! The [`Vocabulary`] is the registry mapping kind names to their spec and
//! serialization hook. A tree only ever annotates nodes whose kind resolves
//! to a registered entry.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::doc::Doc;
use crate::error::TreeError;
use crate::tree::arena::Tree;
use crate::tree::node::{FieldValue, Node, NodeId};

/// Field names that collide with annotation metadata and may not be declared.
pub const RESERVED_FIELDS: &[&str] = &[
    "uid",
    "id",
    "nid",
    "level",
    "parent",
    "prev",
    "next",
    "hash",
    "sibling_index",
    "sibling_count",
];

/// Sentinel mixed into a parent's digest for an absent optional child.
const ABSENT_HASH: u64 = 0x5eed_ab5e_0000_0001;

/// The four structural field kinds a spec can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A single child node that must be present
    Required,
    /// A single child node or nothing
    Optional,
    /// An ordered list of child nodes
    List,
    /// An opaque leaf datum, hashed by value and skipped by iteration
    Value,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Required => "required child",
            FieldKind::Optional => "optional child",
            FieldKind::List => "child list",
            FieldKind::Value => "opaque",
        };
        f.write_str(name)
    }
}

/// One declared field: a name and its structural kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
}

impl FieldSpec {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Declare a single child field that must be present.
pub fn required(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Required,
    }
}

/// Declare a single child field that may be absent.
pub fn optional(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Optional,
    }
}

/// Declare an ordered list of child nodes.
pub fn list(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::List,
    }
}

/// Declare an opaque value field, hashed by value and invisible to iteration.
pub fn value(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Value,
    }
}

/// The ordered field declaration for one node kind.
///
/// Declared order is child iteration order and must equal left-to-right
/// source order.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    fields: Vec<FieldSpec>,
}

impl NodeSpec {
    /// Build a spec from its field declarations.
    ///
    /// Fails on a duplicate field name or a name reserved for annotation
    /// metadata.
    pub fn new(fields: impl IntoIterator<Item = FieldSpec>) -> Result<Self, TreeError> {
        let fields: Vec<FieldSpec> = fields.into_iter().collect();
        for (i, field) in fields.iter().enumerate() {
            if RESERVED_FIELDS.contains(&field.name) {
                return Err(TreeError::ReservedField { field: field.name });
            }
            if fields[..i].iter().any(|prior| prior.name == field.name) {
                return Err(TreeError::DuplicateField { field: field.name });
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Check that `node`'s runtime fields satisfy this spec.
    ///
    /// Each declared field must be present and hold the declared shape; any
    /// field outside the declaration fails the node outright, since an
    /// undeclared field would silently escape hashing and iteration.
    pub fn validate(&self, node: &Node) -> Result<(), TreeError> {
        let kind = node.kind();
        for field in &self.fields {
            let Some(found) = node.field(field.name) else {
                return Err(TreeError::MissingField {
                    kind,
                    field: field.name,
                });
            };
            let matches = matches!(
                (field.kind, found),
                (FieldKind::Required, FieldValue::Child(_))
                    | (FieldKind::Optional, FieldValue::MaybeChild(_))
                    | (FieldKind::List, FieldValue::Children(_))
                    | (FieldKind::Value, FieldValue::Datum(_))
            );
            if !matches {
                return Err(TreeError::FieldMismatch {
                    kind,
                    field: field.name,
                    expected: field.kind,
                    found: found.shape_name(),
                });
            }
        }
        for name in node.field_names() {
            if !self.fields.iter().any(|f| f.name == name) {
                return Err(TreeError::UndeclaredField { kind, field: name });
            }
        }
        Ok(())
    }

    /// Lazily yield `node`'s children in declared field order.
    ///
    /// Value fields and absent optionals contribute nothing.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = NodeId> + 'a {
        self.fields
            .iter()
            .flat_map(move |field| FieldChildren::of(node.field(field.name)))
    }

    /// Digest `node` bottom-up: kind tag, per-field hashes in declared
    /// order, then the attached comment's text.
    ///
    /// `child_hash` supplies the already-computed digest of a child; the
    /// annotation pass guarantees children are hashed before their parent.
    /// The digest discriminates structure deterministically; it makes no
    /// cryptographic claims.
    pub(crate) fn hash_node(&self, node: &Node, child_hash: impl Fn(NodeId) -> u64) -> u64 {
        let mut hasher = DefaultHasher::new();
        node.kind().hash(&mut hasher);
        for field in &self.fields {
            match node.field(field.name) {
                Some(FieldValue::Child(id)) => child_hash(*id).hash(&mut hasher),
                Some(FieldValue::MaybeChild(Some(id))) => child_hash(*id).hash(&mut hasher),
                Some(FieldValue::MaybeChild(None)) | None => ABSENT_HASH.hash(&mut hasher),
                Some(FieldValue::Children(ids)) => {
                    ids.len().hash(&mut hasher);
                    for id in ids {
                        child_hash(*id).hash(&mut hasher);
                    }
                }
                Some(FieldValue::Datum(datum)) => hash_datum(datum, &mut hasher),
            }
        }
        match node.options().comment.as_ref() {
            Some(comment) => {
                1u8.hash(&mut hasher);
                comment.text.hash(&mut hasher);
            }
            None => 0u8.hash(&mut hasher),
        }
        hasher.finish()
    }
}

/// Structural hash of an opaque datum.
///
/// Object entries hash in stored order; `serde_json`'s `preserve_order`
/// feature keeps that order equal to insertion order, so the digest is
/// deterministic for identically-built values.
fn hash_datum(datum: &Value, hasher: &mut impl Hasher) {
    match datum {
        Value::Null => 0u8.hash(hasher),
        Value::Bool(b) => {
            1u8.hash(hasher);
            b.hash(hasher);
        }
        Value::Number(n) => {
            2u8.hash(hasher);
            n.to_string().hash(hasher);
        }
        Value::String(s) => {
            3u8.hash(hasher);
            s.hash(hasher);
        }
        Value::Array(items) => {
            4u8.hash(hasher);
            items.len().hash(hasher);
            for item in items {
                hash_datum(item, hasher);
            }
        }
        Value::Object(entries) => {
            5u8.hash(hasher);
            entries.len().hash(hasher);
            for (key, item) in entries {
                key.hash(hasher);
                hash_datum(item, hasher);
            }
        }
    }
}

/// Iterator over the children a single field contributes.
enum FieldChildren<'a> {
    One(Option<NodeId>),
    Many(std::slice::Iter<'a, NodeId>),
}

impl<'a> FieldChildren<'a> {
    fn of(field: Option<&'a FieldValue>) -> Self {
        match field {
            Some(FieldValue::Child(id)) => FieldChildren::One(Some(*id)),
            Some(FieldValue::MaybeChild(id)) => FieldChildren::One(*id),
            Some(FieldValue::Children(ids)) => FieldChildren::Many(ids.iter()),
            Some(FieldValue::Datum(_)) | None => FieldChildren::One(None),
        }
    }
}

impl Iterator for FieldChildren<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self {
            FieldChildren::One(id) => id.take(),
            FieldChildren::Many(ids) => ids.next().copied(),
        }
    }
}

/// Serialization hook: builds the layout document for one node.
pub type PrettyFn = Box<dyn Fn(&Tree, &Node) -> Doc + Send + Sync>;

/// One registered node kind: its spec plus its serialization hook.
pub struct NodeKind {
    name: &'static str,
    spec: NodeSpec,
    pretty: PrettyFn,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    /// Invoke the serialization hook.
    pub fn pretty(&self, tree: &Tree, node: &Node) -> Doc {
        (self.pretty)(tree, node)
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeKind")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Registry of node kinds, shared by every tree of one language.
///
/// Build the vocabulary once at parser setup and hand an `Arc` of it to
/// each [`crate::tree::TreeBuilder`]. Registering the serialization hook is
/// part of registration, so an annotated node always knows how to print
/// itself.
#[derive(Default)]
pub struct Vocabulary {
    kinds: IndexMap<&'static str, NodeKind>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node kind under `name`.
    ///
    /// Fails if `name` is already taken.
    pub fn register(
        &mut self,
        name: &'static str,
        spec: NodeSpec,
        pretty: impl Fn(&Tree, &Node) -> Doc + Send + Sync + 'static,
    ) -> Result<(), TreeError> {
        if self.kinds.contains_key(name) {
            return Err(TreeError::DuplicateKind { kind: name });
        }
        self.kinds.insert(
            name,
            NodeKind {
                name,
                spec,
                pretty: Box::new(pretty),
            },
        );
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Option<&NodeKind> {
        self.kinds.get(kind)
    }

    pub fn spec_of(&self, kind: &str) -> Option<&NodeSpec> {
        self.kinds.get(kind).map(NodeKind::spec)
    }

    /// Registered kind names, in registration order.
    pub fn kind_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocabulary")
            .field("kinds", &self.kinds.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::Node;
    use crate::tree::pos::Span;
    use serde_json::json;

    fn pair_spec() -> NodeSpec {
        NodeSpec::new([required("left"), optional("right"), value("tag")])
            .expect("valid declaration")
    }

    #[test]
    fn reserved_names_are_rejected_at_declaration() {
        let err = NodeSpec::new([required("nid")]).unwrap_err();
        assert!(matches!(err, TreeError::ReservedField { field: "nid" }));
    }

    #[test]
    fn duplicate_names_are_rejected_at_declaration() {
        let err = NodeSpec::new([required("x"), list("x")]).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateField { field: "x" }));
    }

    #[test]
    fn missing_declared_field_fails_validation() {
        let spec = pair_spec();
        let node = Node::new("pair", Span::at(0, 0, 0, 4)).child("left", NodeId(0));
        let err = spec.validate(&node).unwrap_err();
        assert!(matches!(err, TreeError::MissingField { field: "right", .. }));
    }

    #[test]
    fn wrong_field_shape_fails_validation() {
        let spec = pair_spec();
        let node = Node::new("pair", Span::at(0, 0, 0, 4))
            .datum("left", json!(1))
            .maybe_child("right", None)
            .datum("tag", json!("t"));
        let err = spec.validate(&node).unwrap_err();
        assert!(matches!(
            err,
            TreeError::FieldMismatch {
                field: "left",
                expected: FieldKind::Required,
                ..
            }
        ));
    }

    #[test]
    fn undeclared_extra_field_fails_validation() {
        let spec = pair_spec();
        let node = Node::new("pair", Span::at(0, 0, 0, 4))
            .child("left", NodeId(0))
            .maybe_child("right", None)
            .datum("tag", json!("t"))
            .datum("sneaky", json!(true));
        let err = spec.validate(&node).unwrap_err();
        assert!(matches!(
            err,
            TreeError::UndeclaredField { field: "sneaky", .. }
        ));
    }

    #[test]
    fn children_follow_declared_order_and_skip_values() {
        let spec = NodeSpec::new([value("head"), required("a"), list("rest"), optional("b")])
            .expect("valid declaration");
        let node = Node::new("seq", Span::at(0, 0, 0, 9))
            .datum("head", json!("h"))
            .child("a", NodeId(3))
            .children("rest", vec![NodeId(1), NodeId(2)])
            .maybe_child("b", Some(NodeId(0)));
        let order: Vec<NodeId> = spec.children(&node).collect();
        assert_eq!(order, vec![NodeId(3), NodeId(1), NodeId(2), NodeId(0)]);
    }

    #[test]
    fn absent_optional_hashes_differently_from_present() {
        let spec = pair_spec();
        let absent = Node::new("pair", Span::at(0, 0, 0, 4))
            .child("left", NodeId(0))
            .maybe_child("right", None)
            .datum("tag", json!("t"));
        let present = Node::new("pair", Span::at(0, 0, 0, 4))
            .child("left", NodeId(0))
            .maybe_child("right", Some(NodeId(1)))
            .datum("tag", json!("t"));
        let child_hash = |_| 7u64;
        assert_ne!(
            spec.hash_node(&absent, child_hash),
            spec.hash_node(&present, child_hash)
        );
    }

    #[test]
    fn datum_hash_distinguishes_values_deterministically() {
        let spec = NodeSpec::new([value("v")]).expect("valid declaration");
        let mk = |v: Value| Node::new("lit", Span::at(0, 0, 0, 1)).datum("v", v);
        let h = |n: &Node| spec.hash_node(n, |_| 0);
        assert_eq!(h(&mk(json!(42))), h(&mk(json!(42))));
        assert_ne!(h(&mk(json!(42))), h(&mk(json!("42"))));
        assert_ne!(h(&mk(json!([1, 2]))), h(&mk(json!([2, 1]))));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut vocab = Vocabulary::new();
        vocab
            .register("lit", NodeSpec::new([value("v")]).unwrap(), |_, _| {
                Doc::empty()
            })
            .expect("first registration");
        let err = vocab
            .register("lit", NodeSpec::new([value("v")]).unwrap(), |_, _| {
                Doc::empty()
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateKind { kind: "lit" }));
    }
}
