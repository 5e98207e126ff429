//! Line bookmarks that follow the text they were set on.

use std::rc::Rc;

use super::listeners::{ListenerId, Listeners};
use super::DocumentChange;
use crate::direction::Direction;
use crate::error::{KernelError, Result};
use crate::position::Position;

/// Receives bookmark changes of one document.
pub trait BookmarkListener {
    /// The mark on `line` was set, cleared, or moved onto `line`.
    fn bookmark_changed(&self, line: usize);
    /// Every mark was removed at once.
    fn bookmark_cleared(&self);
}

/// The set of bookmarked lines of a document.
///
/// Obtained through [`crate::Document::bookmarker`]; the document keeps the
/// marks in step with its edits.
#[derive(Debug)]
pub struct Bookmarker {
    // strictly ascending
    lines: Vec<usize>,
    number_of_lines: usize,
    listeners: Listeners<dyn BookmarkListener>,
}

impl Bookmarker {
    pub(crate) fn new(number_of_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            number_of_lines,
            listeners: Listeners::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Rc<dyn BookmarkListener>) -> Result<ListenerId> {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Result<()> {
        self.listeners.remove(id).map(drop)
    }

    /// Sets (`set == true`) or clears the mark on `line`.
    pub fn mark(&mut self, line: usize, set: bool) -> Result<()> {
        self.check_line(line)?;
        match (self.lines.binary_search(&line), set) {
            (Ok(i), false) => {
                self.lines.remove(i);
            }
            (Err(i), true) => self.lines.insert(i, line),
            _ => return Ok(()),
        }
        self.listeners.notify(|l| l.bookmark_changed(line));
        Ok(())
    }

    pub fn is_marked(&self, line: usize) -> Result<bool> {
        self.check_line(line)?;
        Ok(self.lines.binary_search(&line).is_ok())
    }

    pub fn toggle(&mut self, line: usize) -> Result<()> {
        self.check_line(line)?;
        match self.lines.binary_search(&line) {
            Ok(i) => {
                self.lines.remove(i);
            }
            Err(i) => self.lines.insert(i, line),
        }
        self.listeners.notify(|l| l.bookmark_changed(line));
        Ok(())
    }

    /// Removes every mark.
    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            self.lines.clear();
            self.listeners.notify(|l| l.bookmark_cleared());
        }
    }

    pub fn number_of_marks(&self) -> usize {
        self.lines.len()
    }

    /// Marked lines in ascending order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.lines.iter().copied()
    }

    /// Returns the line of the `marks`-th bookmark after (or before) `from`.
    ///
    /// With `marks == 0` this returns `from` if it is marked. When
    /// `wrap_around` is set the search continues from the other end of the
    /// document, and `marks` larger than the number of marks is reduced
    /// modulo that number.
    pub fn next(
        &self,
        from: usize,
        direction: Direction,
        wrap_around: bool,
        marks: usize,
    ) -> Result<Option<usize>> {
        self.check_line(from)?;
        let count = self.lines.len();
        if count == 0 {
            return Ok(None);
        }
        if marks == 0 {
            return Ok(self.lines.binary_search(&from).ok().map(|_| from));
        }

        let mut marks = marks;
        if marks > count {
            if !wrap_around {
                return Ok(None);
            }
            marks %= count;
            if marks == 0 {
                marks = count;
            }
        }

        let mut i = self.lines.partition_point(|&line| line < from);
        match direction {
            Direction::Forward => {
                if i == count {
                    if !wrap_around {
                        return Ok(None);
                    }
                    i = 0;
                    marks -= 1;
                } else if self.lines[i] != from {
                    // lines[i] is already the first mark past `from`
                    marks -= 1;
                }
                i += marks;
                if i >= count {
                    if !wrap_around {
                        return Ok(None);
                    }
                    i -= count;
                }
            }
            Direction::Backward => {
                if i < marks {
                    if !wrap_around {
                        return Ok(None);
                    }
                    i += count;
                }
                i -= marks;
            }
        }
        Ok(Some(self.lines[i]))
    }

    /// Adjusts the marks after an edit. `number_of_lines` is the line count
    /// of the edited document.
    pub(crate) fn document_changed(&mut self, change: &DocumentChange, number_of_lines: usize) {
        self.number_of_lines = number_of_lines;
        if self.lines.is_empty() {
            return;
        }

        let erased = change.erased_region();
        let (b, e) = (erased.beginning().line, erased.end().line);
        if e > b {
            let first_inner = self.lines.partition_point(|&line| line <= b);
            let end_line_index = self.lines.partition_point(|&line| line < e);
            let removed: Vec<usize> = self.lines.drain(first_inner..end_line_index).collect();

            let mut collapsed = false;
            let mut i = first_inner;
            if self.lines.get(i) == Some(&e) {
                if i > 0 && self.lines[i - 1] == b {
                    self.lines.remove(i);
                } else {
                    self.lines[i] = b;
                    i += 1;
                }
                collapsed = true;
            }
            for line in &mut self.lines[i..] {
                *line -= e - b;
            }

            for line in removed {
                self.listeners.notify(|l| l.bookmark_changed(line));
            }
            if collapsed {
                self.listeners.notify(|l| l.bookmark_changed(b));
            }
        }

        let inserted = change.inserted_region();
        let (s, k) = (inserted.beginning(), inserted.end().line - inserted.beginning().line);
        if k > 0 {
            let first_moved = if s.offset_in_line == 0 {
                self.lines.partition_point(|&line| line < s.line)
            } else {
                self.lines.partition_point(|&line| line <= s.line)
            };
            for line in &mut self.lines[first_moved..] {
                *line += k;
            }
        }
    }

    pub(crate) fn document_reset(&mut self, number_of_lines: usize) {
        self.number_of_lines = number_of_lines;
        self.clear();
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if line >= self.number_of_lines {
            return Err(KernelError::BadPosition(Position::bol(line)));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Bookmarker {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
