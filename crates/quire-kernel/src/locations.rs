//! Gravity-based position tracking.
//!
//! These functions compute where a position must move after one edit so that
//! it keeps pointing at the same surrounding text. They are total and pure:
//! deletion is applied first (in pre-edit coordinates), then insertion (in
//! post-edit coordinates).
//!
//! | case | before | after |
//! |------|--------|-------|
//! | deletion, position before | `a b\|c D E F g` | `a b\|c g` |
//! | deletion, position inside | `a b c D\|E F g` | `a b c\|g` |
//! | deletion, position after | `a b c D E F g\|h` | `a b c g\|h` |
//! | insertion at position, forward | `a b\|c` + `XY` | `a b\|XYc` |
//! | insertion at position, backward | `a b\|c` + `XY` | `a bXY\|c` |

use crate::direction::Direction;
use crate::document::DocumentChange;
use crate::position::{Position, Region};

/// Returns the position `position` moves to after `change`.
///
/// `gravity` only matters when text is inserted exactly at `position`:
/// [`Direction::Forward`] keeps the position in front of the new text,
/// [`Direction::Backward`] moves it behind.
#[must_use]
pub fn update_position(position: Position, change: &DocumentChange, gravity: Direction) -> Position {
    let after_deletion = update_position_for_deletion(position, change.erased_region());
    update_position_for_insertion(after_deletion, change.inserted_region(), gravity)
}

/// Moves `position` to account for the removal of `erased`.
#[must_use]
pub fn update_position_for_deletion(position: Position, erased: Region) -> Position {
    let (b, e) = (erased.beginning(), erased.end());
    if erased.is_empty() || position <= b {
        position
    } else if position < e {
        b
    } else if position.line == e.line {
        Position::new(b.line, b.offset_in_line + (position.offset_in_line - e.offset_in_line))
    } else {
        Position::new(position.line - (e.line - b.line), position.offset_in_line)
    }
}

/// Moves `position` to account for the text now occupying `inserted`.
#[must_use]
pub fn update_position_for_insertion(
    position: Position,
    inserted: Region,
    gravity: Direction,
) -> Position {
    let (s, e) = (inserted.beginning(), inserted.end());
    if inserted.is_empty() || position < s {
        return position;
    }
    if position == s {
        return match gravity {
            Direction::Forward => s,
            Direction::Backward => e,
        };
    }
    if position.line == s.line {
        Position::new(e.line, e.offset_in_line + (position.offset_in_line - s.offset_in_line))
    } else {
        Position::new(position.line + (e.line - s.line), position.offset_in_line)
    }
}
