//! Source positions and spans
//!
//! Coordinates are `{line, ch}` pairs, 0-based, ordered line-major. A
//! [`Span`] is the half-closed region a node occupies in the source text;
//! spans compare and cover the way the navigation queries need them to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A source coordinate: 0-based line and character column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub ch: u32,
}

impl Position {
    pub const fn new(line: u32, ch: u32) -> Self {
        Self { line, ch }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

/// The source region a node occupies, from its first to one past its last
/// character.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Span {
    pub from: Position,
    pub to: Position,
}

impl Span {
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// Convenience constructor from raw coordinates.
    pub const fn at(from_line: u32, from_ch: u32, to_line: u32, to_ch: u32) -> Self {
        Self {
            from: Position::new(from_line, from_ch),
            to: Position::new(to_line, to_ch),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.from <= self.to
    }

    /// Whether `pos` falls inside this span, boundaries included.
    pub fn contains(&self, pos: Position) -> bool {
        self.from <= pos && pos <= self.to
    }

    /// Whether `other` falls entirely inside this span.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_order_line_major() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn span_containment_includes_boundaries() {
        let span = Span::at(1, 2, 1, 6);
        assert!(span.contains(Position::new(1, 2)));
        assert!(span.contains(Position::new(1, 6)));
        assert!(!span.contains(Position::new(1, 7)));
        assert!(!span.contains(Position::new(0, 4)));
    }

    #[test]
    fn cover_takes_the_union() {
        let a = Span::at(0, 4, 0, 8);
        let b = Span::at(0, 10, 1, 2);
        assert_eq!(a.cover(&b), Span::at(0, 4, 1, 2));
        assert_eq!(b.cover(&a), Span::at(0, 4, 1, 2));
    }

    #[test]
    fn backwards_span_is_rejected() {
        assert!(!Span::at(2, 0, 1, 0).is_well_formed());
        assert!(Span::at(1, 3, 1, 3).is_well_formed());
    }
}
