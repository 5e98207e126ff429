//! Position and region values.
//!
//! A [`Position`] addresses a code unit (a UTF-8 byte) inside a line; a
//! [`Region`] is a normalized, half-open pair of positions. Both are plain
//! values: bounds checking against a concrete document happens in
//! [`crate::text::TextBuffer`].

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A location in a document, ordered lexicographically by `(line, offset_in_line)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based byte offset within the line.
    pub offset_in_line: usize,
}

impl Position {
    /// The beginning of the document.
    pub const ZERO: Position = Position {
        line: 0,
        offset_in_line: 0,
    };

    pub const fn new(line: usize, offset_in_line: usize) -> Self {
        Self {
            line,
            offset_in_line,
        }
    }

    /// Returns the beginning of the document.
    #[must_use]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Returns the beginning of `line`.
    #[must_use]
    pub const fn bol(line: usize) -> Self {
        Self::new(line, 0)
    }

    /// Returns the beginning of the line containing this position.
    #[must_use]
    pub const fn beginning_of_line(self) -> Self {
        Self::bol(self.line)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.offset_in_line)
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, offset_in_line): (usize, usize)) -> Self {
        Self::new(line, offset_in_line)
    }
}

/// A half-open range `[beginning, end)` between two positions.
///
/// The constructor normalizes its arguments, so `beginning() <= end()` always
/// holds and `Region::new(a, b) == Region::new(b, a)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Position, Position)", into = "(Position, Position)")]
pub struct Region {
    first: Position,
    second: Position,
}

impl Region {
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// Creates an empty region at `p`.
    #[must_use]
    pub const fn empty_at(p: Position) -> Self {
        Self {
            first: p,
            second: p,
        }
    }

    /// Creates a region within one line covering the given columns.
    pub fn single_line(line: usize, columns: Range<usize>) -> Self {
        Self::new(
            Position::new(line, columns.start),
            Position::new(line, columns.end),
        )
    }

    #[must_use]
    pub const fn beginning(&self) -> Position {
        self.first
    }

    #[must_use]
    pub const fn end(&self) -> Position {
        self.second
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first == self.second
    }

    /// Returns the lines touched by this region, `beginning.line ..= end.line`,
    /// as a half-open range.
    #[must_use]
    pub fn lines(&self) -> Range<usize> {
        self.first.line..self.second.line + 1
    }

    /// Returns true if `p` lies within the region, both ends included.
    #[must_use]
    pub fn includes(&self, p: Position) -> bool {
        p >= self.first && p <= self.second
    }

    /// Returns true if `other` lies entirely inside this region.
    #[must_use]
    pub fn encompasses(&self, other: &Region) -> bool {
        self.first <= other.first && self.second >= other.second
    }

    #[must_use]
    pub fn intersects_with(&self, other: &Region) -> bool {
        self.includes(other.first)
            || self.includes(other.second)
            || other.includes(self.first)
    }

    /// Returns the overlap of the two regions, or `None` if they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        self.intersects_with(other).then(|| {
            Region::new(
                self.first.max(other.first),
                self.second.min(other.second),
            )
        })
    }

    /// Returns the smallest region covering both, or `None` if they are disjoint.
    #[must_use]
    pub fn union(&self, other: &Region) -> Option<Region> {
        self.intersects_with(other).then(|| {
            Region::new(
                self.first.min(other.first),
                self.second.max(other.second),
            )
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.first, self.second)
    }
}

impl From<(Position, Position)> for Region {
    fn from((a, b): (Position, Position)) -> Self {
        Self::new(a, b)
    }
}

impl From<Region> for (Position, Position) {
    fn from(region: Region) -> Self {
        (region.first, region.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn positions_order_by_line_then_offset() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(3, 1) < Position::new(3, 2));
        assert_eq!(Position::new(2, 2), Position::from((2, 2)));
        assert_eq!(Position::zero(), Position::ZERO);
    }

    #[test]
    fn bol_drops_the_column() {
        assert_eq!(Position::bol(4), Position::new(4, 0));
        assert_eq!(Position::new(4, 7).beginning_of_line(), Position::new(4, 0));
    }

    #[rstest]
    #[case((0, 0), (0, 0))]
    #[case((0, 3), (2, 1))]
    #[case((5, 1), (5, 0))]
    #[case((7, 2), (1, 9))]
    fn region_construction_is_order_independent(
        #[case] a: (usize, usize),
        #[case] b: (usize, usize),
    ) {
        let forward = Region::new(a.into(), b.into());
        let backward = Region::new(b.into(), a.into());
        assert_eq!(forward, backward);
        assert!(forward.beginning() <= forward.end());
    }

    #[test]
    fn lines_cover_both_ends() {
        let r = Region::new(Position::new(2, 4), Position::new(5, 0));
        assert_eq!(r.lines(), 2..6);
        assert_eq!(Region::empty_at(Position::new(3, 3)).lines(), 3..4);
    }

    #[test]
    fn intersection_and_union() {
        let a = Region::single_line(0, 2..6);
        let b = Region::single_line(0, 4..9);
        let c = Region::single_line(1, 0..1);

        assert_eq!(a.intersection(&b), Some(Region::single_line(0, 4..6)));
        assert_eq!(a.union(&b), Some(Region::single_line(0, 2..9)));
        assert_eq!(a.intersection(&c), None);
        assert_eq!(a.union(&c), None);
        assert!(Region::single_line(0, 0..10).encompasses(&a));
        assert!(!a.encompasses(&b));
    }

    #[test]
    fn display_formats() {
        let r = Region::new(Position::new(1, 2), Position::new(0, 5));
        assert_eq!(r.to_string(), "[(0, 5), (1, 2))");
    }
}
