use std::borrow::Cow;

use xi_rope::Rope;

use crate::error::{KernelError, Result};
use crate::position::{Position, Region};

/// Line-addressed text storage backed by an `xi_rope::Rope`.
///
/// Lines are separated by `'\n'`; the separator is not part of the line text.
/// A buffer always has at least one (possibly empty) line.
#[derive(Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
        }
    }

    /// Total length in bytes, separators included.
    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    pub fn number_of_lines(&self) -> usize {
        self.rope.line_of_offset(self.rope.len()) + 1
    }

    /// Returns the text of `line` without its separator.
    pub fn line(&self, line: usize) -> Result<Cow<'_, str>> {
        let (start, end) = self.line_bounds(line)?;
        Ok(self.rope.slice_to_cow(start..end))
    }

    pub fn line_length(&self, line: usize) -> Result<usize> {
        let (start, end) = self.line_bounds(line)?;
        Ok(end - start)
    }

    /// The region spanning the whole buffer.
    pub fn region(&self) -> Region {
        Region::new(Position::ZERO, self.end())
    }

    /// The position just past the last character.
    pub fn end(&self) -> Position {
        self.position_of(self.rope.len())
    }

    /// Checks that `position` names an existing line and a char boundary in it.
    pub fn validate(&self, position: Position) -> Result<()> {
        let (start, end) = self
            .line_bounds(position.line)
            .map_err(|_| KernelError::BadPosition(position))?;
        if position.offset_in_line > end - start {
            return Err(KernelError::BadPosition(position));
        }
        let line = self.rope.slice_to_cow(start..end);
        if !line.is_char_boundary(position.offset_in_line) {
            return Err(KernelError::BadPosition(position));
        }
        Ok(())
    }

    pub fn validate_region(&self, region: Region) -> Result<()> {
        self.validate(region.beginning())
            .and_then(|()| self.validate(region.end()))
            .map_err(|_| KernelError::BadRegion(region))
    }

    /// Converts a valid position to an absolute byte offset.
    pub fn offset_of(&self, position: Position) -> Result<usize> {
        self.validate(position)?;
        Ok(self.rope.offset_of_line(position.line) + position.offset_in_line)
    }

    /// Converts an absolute byte offset to a position. Offsets past the end
    /// are clamped to the end of the buffer.
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len());
        let line = self.rope.line_of_offset(offset);
        Position::new(line, offset - self.rope.offset_of_line(line))
    }

    /// Replaces `region` with `text` and returns the erased region (in the
    /// old coordinates) and the inserted region (in the new coordinates).
    pub fn replace(&mut self, region: Region, text: &str) -> Result<(Region, Region)> {
        self.validate_region(region)?;
        let start = self.rope.offset_of_line(region.beginning().line)
            + region.beginning().offset_in_line;
        let end =
            self.rope.offset_of_line(region.end().line) + region.end().offset_in_line;

        self.rope.edit(start..end, text);

        let inserted = Region::new(region.beginning(), self.position_of(start + text.len()));
        Ok((region, inserted))
    }

    /// Returns the whole content as a `String`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    fn line_bounds(&self, line: usize) -> Result<(usize, usize)> {
        let count = self.number_of_lines();
        if line >= count {
            return Err(KernelError::BadPosition(Position::bol(line)));
        }
        let start = self.rope.offset_of_line(line);
        let end = if line + 1 < count {
            self.rope.offset_of_line(line + 1) - 1
        } else {
            self.rope.len()
        };
        Ok((start, end))
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("len", &self.rope.len())
            .field("lines", &self.number_of_lines())
            .finish()
    }
}
