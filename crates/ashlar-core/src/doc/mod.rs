//! Layout documents for regenerating source text
//!
//! A [`Doc`] is an immutable, layout-flexible text fragment. Serialization
//! hooks build one Doc per node out of six combinators — [`Doc::empty`],
//! [`txt`], [`horz`], [`vert`], [`concat`], and [`if_flat`] — and
//! [`Doc::display`] renders the result at a target width in one pass.
//!
//! Every Doc caches its own flat width at construction (`None` when the
//! fragment contains an unconditional break). [`if_flat`] reads only that
//! cached width to decide between its branches — it never renders the flat
//! branch just to measure it — which keeps rendering linear in document
//! size instead of exponential in nesting depth.
//!
//! Width is plain character count; wide characters are not special-cased.

mod printer;

pub use printer::PrintOptions;

use std::fmt;
use std::rc::Rc;

/// An immutable layout fragment with a cached flat width.
///
/// Cloning is cheap; the underlying fragment is shared.
#[derive(Clone)]
pub struct Doc {
    inner: Rc<DocInner>,
}

struct DocInner {
    kind: DocKind,
    /// Single-line width were every conditional rendered flat; `None` when
    /// the fragment contains an unconditional break.
    flat_width: Option<usize>,
}

enum DocKind {
    Empty,
    Text(String),
    /// Left-to-right join; each operand's indent baseline is the column
    /// where the operand starts
    Horz(Doc, Doc),
    /// Stacked lines, each starting at the enclosing indent column
    Vert(Doc, Doc),
    /// Left-to-right join that keeps the enclosing indent baseline
    Concat(Doc, Doc),
    /// Pick the first operand when its flat width fits the remaining
    /// budget, the second otherwise
    IfFlat(Doc, Doc),
}

impl Doc {
    fn make(kind: DocKind, flat_width: Option<usize>) -> Doc {
        Doc {
            inner: Rc::new(DocInner { kind, flat_width }),
        }
    }

    /// The zero-width fragment.
    pub fn empty() -> Doc {
        Doc::make(DocKind::Empty, Some(0))
    }

    /// An atomic single-line fragment.
    ///
    /// # Panics
    ///
    /// Panics if `text` contains a newline: the width algorithm has no
    /// valid reading of an atomic fragment with a forced break. Split the
    /// text and join the pieces with [`vert`] instead.
    pub fn text(text: impl Into<String>) -> Doc {
        let text = text.into();
        assert!(
            !text.contains('\n'),
            "atomic text fragment may not contain a newline: {text:?}"
        );
        let width = text.chars().count();
        Doc::make(DocKind::Text(text), Some(width))
    }

    /// The cached single-line width, `None` when the fragment contains an
    /// unconditional break.
    pub fn flat_width(&self) -> Option<usize> {
        self.inner.flat_width
    }

    fn horz2(left: Doc, right: Doc) -> Doc {
        let width = add_widths(left.flat_width(), right.flat_width());
        Doc::make(DocKind::Horz(left, right), width)
    }

    fn vert2(top: Doc, bottom: Doc) -> Doc {
        Doc::make(DocKind::Vert(top, bottom), None)
    }

    fn concat2(left: Doc, right: Doc) -> Doc {
        let width = add_widths(left.flat_width(), right.flat_width());
        Doc::make(DocKind::Concat(left, right), width)
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            DocKind::Empty => f.write_str("Empty"),
            DocKind::Text(text) => write!(f, "Text({text:?})"),
            DocKind::Horz(a, b) => f.debug_tuple("Horz").field(a).field(b).finish(),
            DocKind::Vert(a, b) => f.debug_tuple("Vert").field(a).field(b).finish(),
            DocKind::Concat(a, b) => f.debug_tuple("Concat").field(a).field(b).finish(),
            DocKind::IfFlat(a, b) => f.debug_tuple("IfFlat").field(a).field(b).finish(),
        }
    }
}

fn add_widths(left: Option<usize>, right: Option<usize>) -> Option<usize> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l + r),
        _ => None,
    }
}

/// Fold a sequence of fragments with a binary constructor, empty for an
/// empty sequence.
fn fold(docs: impl IntoIterator<Item = Doc>, join: fn(Doc, Doc) -> Doc) -> Doc {
    let mut docs = docs.into_iter();
    let Some(first) = docs.next() else {
        return Doc::empty();
    };
    docs.fold(first, join)
}

/// An atomic single-line fragment; see [`Doc::text`].
pub fn txt(text: impl Into<String>) -> Doc {
    Doc::text(text)
}

/// Join fragments left to right on one line.
///
/// Each operand's indent baseline is rebased to the column where the
/// operand begins, so a [`vert`] nested inside lines its later rows up
/// under its own first character.
pub fn horz(docs: impl IntoIterator<Item = Doc>) -> Doc {
    fold(docs, Doc::horz2)
}

/// Stack fragments vertically, each line starting at the enclosing indent
/// column.
pub fn vert(docs: impl IntoIterator<Item = Doc>) -> Doc {
    fold(docs, Doc::vert2)
}

/// Join fragments left to right without rebasing the enclosing indent
/// baseline.
pub fn concat(docs: impl IntoIterator<Item = Doc>) -> Doc {
    fold(docs, Doc::concat2)
}

/// Render `flat` when its cached flat width is finite and fits the
/// remaining budget, `broken` otherwise.
pub fn if_flat(flat: Doc, broken: Doc) -> Doc {
    let width = flat.flat_width();
    Doc::make(DocKind::IfFlat(flat, broken), width)
}

/// Join fragments on one line with `sep` between consecutive pairs.
pub fn sep_by(docs: impl IntoIterator<Item = Doc>, sep: &str) -> Doc {
    let mut joined = Vec::new();
    for doc in docs {
        if !joined.is_empty() {
            joined.push(txt(sep));
        }
        joined.push(doc);
    }
    horz(joined)
}

/// Attach a trailing comment to a fragment.
///
/// The comment stays on the same line as long as the combined flat width
/// still fits; otherwise it is promoted to its own line above the
/// fragment. This is the one piece of domain policy layered over the
/// generic algebra.
pub fn with_comment(doc: Doc, comment: &str) -> Doc {
    if comment.is_empty() {
        return doc;
    }
    let attached = horz([doc.clone(), txt(" "), txt(comment)]);
    let promoted = vert([txt(comment), doc]);
    if_flat(attached, promoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_widths_accumulate_across_joins() {
        assert_eq!(Doc::empty().flat_width(), Some(0));
        assert_eq!(txt("abcd").flat_width(), Some(4));
        assert_eq!(horz([txt("ab"), txt("cd"), txt("e")]).flat_width(), Some(5));
        assert_eq!(concat([txt("ab"), txt("cd")]).flat_width(), Some(4));
    }

    #[test]
    fn vert_poisons_the_flat_width() {
        let stacked = vert([txt("a"), txt("b")]);
        assert_eq!(stacked.flat_width(), None);
        assert_eq!(horz([txt("x"), stacked]).flat_width(), None);
    }

    #[test]
    fn if_flat_carries_the_flat_branch_width() {
        let doc = if_flat(txt("abc"), vert([txt("a"), txt("bc")]));
        assert_eq!(doc.flat_width(), Some(3));
        let never_flat = if_flat(vert([txt("a"), txt("b")]), txt("ab"));
        assert_eq!(never_flat.flat_width(), None);
    }

    #[test]
    fn width_counts_characters_not_bytes() {
        assert_eq!(txt("héllo").flat_width(), Some(5));
    }

    #[test]
    #[should_panic(expected = "may not contain a newline")]
    fn embedded_newline_is_a_precondition_violation() {
        let _ = txt("two\nlines");
    }

    #[test]
    fn empty_sequences_collapse_to_empty() {
        assert_eq!(horz([]).flat_width(), Some(0));
        assert_eq!(vert([]).flat_width(), Some(0));
        assert_eq!(sep_by([], ", ").flat_width(), Some(0));
    }
}
