//! Regenerating source text and debug dumps from a tree
//!
//! Every registered kind's serialization hook builds a layout [`Doc`] for
//! its node; this module drives those hooks to turn a whole tree back into
//! deterministically formatted source. Blank-line spacing between roots is
//! reproduced from the gap between consecutive full source ranges,
//! attached comments included, so toggling between text and block views
//! round-trips the document shape.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::doc::{Doc, PrintOptions, with_comment};
use crate::tree::arena::Tree;
use crate::tree::node::{FieldValue, NodeId};

impl Tree {
    /// The layout document for one node, attached comment applied.
    ///
    /// The comment rides along on the same line while it fits and is
    /// promoted to its own preceding line otherwise; individual hooks
    /// never deal with comments themselves.
    pub fn node_doc(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        // An annotated node always resolves; only unannotated test
        // fixtures can miss.
        let Some(kind) = self.vocab.get(node.kind()) else {
            return Doc::empty();
        };
        let body = kind.pretty(self, node);
        match &node.options().comment {
            Some(comment) => with_comment(body, &comment.text),
            None => body,
        }
    }

    /// Render one node as source text.
    pub fn node_source(&self, id: NodeId, options: &PrintOptions) -> String {
        self.node_doc(id).display_with(options)
    }

    /// Render the whole forest as source text.
    ///
    /// Roots are emitted in position order; the number of newlines between
    /// two consecutive roots equals the line gap between their original
    /// full source ranges (minimum one), so blank-line groupings survive a
    /// round trip.
    pub fn to_source(&self, options: &PrintOptions) -> String {
        let mut out = String::new();
        let mut prev_end: Option<u32> = None;
        for &root in &self.roots {
            let span = self.src_span(root);
            if let Some(prev_line) = prev_end {
                let newlines = span.from.line.saturating_sub(prev_line).max(1);
                for _ in 0..newlines {
                    out.push('\n');
                }
            }
            out.push_str(&self.node_source(root, options));
            prev_end = Some(self.src_span(root).to.line);
        }
        debug!(roots = self.roots.len(), chars = out.len(), "serialized tree");
        out
    }

    /// A stable JSON dump of the annotated forest, for tooling and
    /// debugging. Child fields nest recursively; opaque data is embedded
    /// as-is.
    pub fn to_json(&self) -> Value {
        Value::Array(self.roots.iter().map(|&root| self.node_json(root)).collect())
    }

    fn node_json(&self, id: NodeId) -> Value {
        let node = self.node(id);
        let mut entry = Map::new();
        entry.insert("kind".to_owned(), json!(node.kind()));
        entry.insert(
            "range".to_owned(),
            json!([
                [node.span().from.line, node.span().from.ch],
                [node.span().to.line, node.span().to.ch],
            ]),
        );
        if let Some(nid) = node.nid() {
            entry.insert("nid".to_owned(), json!(nid));
        }
        if let Some(uid) = node.uid() {
            entry.insert("uid".to_owned(), json!(uid.as_u64()));
        }
        if let Some(comment) = &node.options().comment {
            entry.insert("comment".to_owned(), json!(comment.text));
        }
        if let Some(label) = node.options().aria_label() {
            entry.insert("aria-label".to_owned(), json!(label));
        }
        let mut fields = Map::new();
        for (name, fvalue) in node.fields() {
            let rendered = match fvalue {
                FieldValue::Child(child) => self.node_json(*child),
                FieldValue::MaybeChild(Some(child)) => self.node_json(*child),
                FieldValue::MaybeChild(None) => Value::Null,
                FieldValue::Children(children) => Value::Array(
                    children.iter().map(|&child| self.node_json(child)).collect(),
                ),
                FieldValue::Datum(datum) => datum.clone(),
            };
            fields.insert(name.to_owned(), rendered);
        }
        entry.insert("fields".to_owned(), Value::Object(fields));
        Value::Object(entry)
    }
}
