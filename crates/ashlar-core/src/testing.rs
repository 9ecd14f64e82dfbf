//! Test fixtures: a miniature prefix-expression language
//!
//! A tiny vocabulary — literals and parenthesized applications — plus
//! factory helpers for assembling trees at explicit source positions.
//! Unit tests across the crate build their forests with these instead of
//! repeating node plumbing; downstream crates can use them the same way.
//!
//! Factories panic on registration errors since a broken fixture language
//! is a bug in the fixtures themselves.

use std::sync::Arc;

use serde_json::json;

use crate::doc::{Doc, horz, if_flat, sep_by, txt, vert};
use crate::tree::{
    Comment, Node, NodeId, NodeSpec, Span, TreeBuilder, Vocabulary, list, required, value,
};

/// Vocabulary for the fixture language.
///
/// - `literal`: one opaque `value` field, printed verbatim.
/// - `app`: a required `func` child and an `args` list, printed
///   `(f a b)` when it fits and vertically aligned after the opening
///   parenthesis otherwise.
pub fn expr_vocabulary() -> Arc<Vocabulary> {
    let mut vocab = Vocabulary::new();
    vocab
        .register(
            "literal",
            NodeSpec::new([value("value")]).expect("literal spec"),
            |_, node| {
                let text = node
                    .datum_of("value")
                    .and_then(|datum| datum.as_str())
                    .unwrap_or_default();
                txt(text)
            },
        )
        .expect("register literal");
    vocab
        .register(
            "app",
            NodeSpec::new([required("func"), list("args")]).expect("app spec"),
            |tree, node| {
                let mut items: Vec<Doc> = Vec::new();
                if let Some(func) = node.child_of("func") {
                    items.push(tree.node_doc(func));
                }
                for &arg in node.children_of("args") {
                    items.push(tree.node_doc(arg));
                }
                let flat = horz([txt("("), sep_by(items.clone(), " "), txt(")")]);
                let broken = horz([txt("("), vert(items), txt(")")]);
                if_flat(flat, broken)
            },
        )
        .expect("register app");
    Arc::new(vocab)
}

/// A builder pre-wired to the fixture vocabulary.
pub fn expr_builder() -> TreeBuilder {
    TreeBuilder::new(expr_vocabulary())
}

/// Allocate a literal spanning `text` at `(line, ch)`.
pub fn literal(builder: &mut TreeBuilder, line: u32, ch: u32, text: &str) -> NodeId {
    let span = Span::at(line, ch, line, ch + text.chars().count() as u32);
    builder.alloc(Node::new("literal", span).datum("value", json!(text)))
}

/// Allocate a literal carrying a trailing comment that runs to `end_ch`.
pub fn commented_literal(
    builder: &mut TreeBuilder,
    line: u32,
    ch: u32,
    text: &str,
    comment_text: &str,
    end_ch: u32,
) -> NodeId {
    let text_end = ch + text.chars().count() as u32;
    let span = Span::at(line, ch, line, text_end);
    let comment = Comment::new(Span::at(line, text_end, line, end_ch), comment_text);
    builder.alloc(
        Node::new("literal", span)
            .datum("value", json!(text))
            .comment(comment),
    )
}

/// Allocate an application node over already-allocated children.
pub fn app(builder: &mut TreeBuilder, span: Span, func: NodeId, args: Vec<NodeId>) -> NodeId {
    builder.alloc(
        Node::new("app", span)
            .child("func", func)
            .children("args", args),
    )
}

/// Assemble `(+ 1 2)` starting at column 0 of `line`.
pub fn sum_app(builder: &mut TreeBuilder, line: u32) -> NodeId {
    let op = literal(builder, line, 1, "+");
    let one = literal(builder, line, 3, "1");
    let two = literal(builder, line, 5, "2");
    app(builder, Span::at(line, 0, line, 7), op, vec![one, two])
}
