//! Rule-driven incremental partitioning.
//!
//! The partitioner keeps one entry per transition found in the document. The
//! entry at index 0 is a sentinel standing for the [`DEFAULT_CONTENT`] state
//! at the beginning of the document; every later entry records the token that
//! switched the scanner into its content type.
//!
//! After an edit only the lines from the start of the edited line onwards are
//! scanned again. The scan stops at the first line start past the inserted
//! text at which the new scanner state agrees with the state the old table
//! implies there; the remaining old transitions are then kept as they are.

use std::any::Any;

use super::content_type::{ContentType, DEFAULT_CONTENT};
use super::transition::{MatchCursor, TokenBias, TransitionRule};
use crate::direction::Direction;
use crate::document::{Document, DocumentChange, DocumentPartition, DocumentPartitioner};
use crate::error::{KernelError, Result};
use crate::locations::update_position;
use crate::position::{Position, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Partition {
    content_type: ContentType,
    start: Position,
    token_start: Position,
    token_length: usize,
}

impl Partition {
    fn token_end(&self) -> Position {
        Position::new(
            self.token_start.line,
            self.token_start.offset_in_line + self.token_length,
        )
    }

    const SENTINEL: Partition = Partition {
        content_type: DEFAULT_CONTENT,
        start: Position::ZERO,
        token_start: Position::ZERO,
        token_length: 0,
    };
}

/// A [`DocumentPartitioner`] driven by an ordered list of [`TransitionRule`]s.
///
/// At every position the rules whose source is the current content type are
/// tried in order and the first match switches the content type. A document
/// the rules never match is one [`DEFAULT_CONTENT`] partition.
#[derive(Debug)]
pub struct LexicalPartitioner {
    rules: Vec<TransitionRule>,
    partitions: Vec<Partition>,
    end: Position,
    attached: bool,
    resume_state: Option<ContentType>,
}

impl LexicalPartitioner {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            partitions: vec![Partition::SENTINEL],
            end: Position::ZERO,
            attached: false,
            resume_state: None,
        }
    }

    /// Creates a partitioner with `rules` already set.
    pub fn with_rules(rules: impl IntoIterator<Item = TransitionRule>) -> Result<Self> {
        let mut partitioner = Self::new();
        partitioner.set_rules(rules)?;
        Ok(partitioner)
    }

    /// Replaces the rules. Order matters: earlier rules win.
    ///
    /// Fails while the partitioner is installed in a document.
    pub fn set_rules(&mut self, rules: impl IntoIterator<Item = TransitionRule>) -> Result<()> {
        if self.attached {
            return Err(KernelError::IllegalState(
                "the rules of an attached partitioner cannot change",
            ));
        }
        let rules: Vec<TransitionRule> = rules.into_iter().collect();
        if let Some(rule) = rules.iter().find(|r| r.content_type() == r.destination()) {
            return Err(KernelError::InvalidRule {
                from: rule.content_type(),
                to: rule.destination(),
            });
        }
        self.rules = rules;
        Ok(())
    }

    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The number of transitions in the table.
    pub fn transition_count(&self) -> usize {
        self.partitions.len() - 1
    }

    /// `(content type, start, token start)` of every entry, sentinel included.
    #[cfg(test)]
    pub(crate) fn table(&self) -> Vec<(ContentType, Position, Position)> {
        self.partitions
            .iter()
            .map(|p| (p.content_type, p.start, p.token_start))
            .collect()
    }

    /// The content type in effect just before `at`.
    fn state_before(&self, at: Position) -> ContentType {
        match self.partitions.partition_point(|p| p.token_start < at) {
            0 => DEFAULT_CONTENT,
            i => self.partitions[i - 1].content_type,
        }
    }

    fn end_of(&self, index: usize) -> Position {
        self.partitions
            .get(index + 1)
            .map_or(self.end, |next| next.start)
    }

    fn is_empty_at(&self, index: usize) -> bool {
        self.partitions[index].start == self.end_of(index)
    }

    /// Scans `document` from the beginning of `from_line` in `state`.
    ///
    /// `at_line_start` is asked at every later line start whether scanning can
    /// stop there. Returns the transitions found and the line the scan
    /// stopped at, or `None` when it ran to the end of the document.
    fn scan(
        rules: &[TransitionRule],
        document: &Document,
        from_line: usize,
        mut state: ContentType,
        mut at_line_start: impl FnMut(usize, ContentType) -> bool,
    ) -> (Vec<Partition>, Option<usize>) {
        let mut found = Vec::new();
        let mut cursors = vec![MatchCursor::default(); rules.len()];
        let lines = document.number_of_lines();
        for line_number in from_line..lines {
            if line_number > from_line && at_line_start(line_number, state) {
                return (found, Some(line_number));
            }
            let Ok(line) = document.line(line_number) else {
                break;
            };
            cursors.fill(MatchCursor::default());
            let mut column = 0;
            loop {
                let at_eol = column == line.len();
                let matched = rules
                    .iter()
                    .zip(cursors.iter_mut())
                    .filter(|(rule, _)| rule.content_type() == state)
                    .find_map(|(rule, cursor)| {
                        rule.matches_with(&line, column, cursor).map(|m| (rule, m))
                    });

                if let Some((rule, m)) = matched {
                    let token_start = Position::new(line_number, column);
                    let token_length = if at_eol { 0 } else { m.length };
                    let token_end = Position::new(line_number, column + token_length);
                    found.push(Partition {
                        content_type: rule.destination(),
                        start: match m.bias {
                            TokenBias::Destination => token_start,
                            TokenBias::Source => token_end,
                        },
                        token_start,
                        token_length,
                    });
                    state = rule.destination();
                    if at_eol {
                        break;
                    }
                    column += token_length;
                } else if at_eol {
                    break;
                } else {
                    column += line[column..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        (found, None)
    }

    fn verify(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        debug_assert_eq!(self.partitions.first(), Some(&Partition::SENTINEL));
        for pair in self.partitions.windows(2) {
            debug_assert_ne!(pair[0].content_type, pair[1].content_type, "{pair:?}");
            debug_assert!(pair[0].start <= pair[1].start, "{pair:?}");
        }
        for pair in self.partitions.get(1..).unwrap_or_default().windows(2) {
            debug_assert!(pair[0].token_end() <= pair[1].token_start, "{pair:?}");
            debug_assert!(pair[0].token_start < pair[1].token_start, "{pair:?}");
        }
    }
}

impl Default for LexicalPartitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentPartitioner for LexicalPartitioner {
    fn partition(&self, at: Position) -> DocumentPartition {
        let mut index = self.partitions.partition_point(|p| p.start <= at) - 1;
        if at == self.end && at > Position::ZERO && self.partitions[index].start == at {
            // the document end belongs to the last non-empty partition
            index = self.partitions.partition_point(|p| p.start < at) - 1;
        }
        let content_type = self.partitions[index].content_type;

        let mut first = index;
        while first > 0 {
            let mut previous = first - 1;
            while previous > 0 && self.is_empty_at(previous) {
                previous -= 1;
            }
            if self.is_empty_at(previous) || self.partitions[previous].content_type != content_type
            {
                break;
            }
            first = previous;
        }

        let mut last = index;
        loop {
            let mut next = last + 1;
            while next < self.partitions.len() && self.is_empty_at(next) {
                next += 1;
            }
            if next >= self.partitions.len() || self.partitions[next].content_type != content_type
            {
                break;
            }
            last = next;
        }

        DocumentPartition {
            content_type,
            region: Region::new(self.partitions[first].start, self.end_of(last)),
        }
    }

    fn document_about_to_be_changed(&mut self, _document: &Document, region: Region) {
        self.resume_state = Some(self.state_before(Position::bol(region.beginning().line)));
    }

    fn document_changed(&mut self, document: &Document, change: &DocumentChange) -> Option<Region> {
        let erased = change.erased_region();
        let inserted = change.inserted_region();
        let resume_at = Position::bol(erased.beginning().line);
        let resume_state = self
            .resume_state
            .take()
            .unwrap_or_else(|| self.state_before(resume_at));

        // Transitions from `resume_at` up to the erasure end are rescanned;
        // the ones after it survive, moved into the new coordinates.
        let first_stale = self
            .partitions
            .partition_point(|p| p.token_start < resume_at)
            .max(1);
        let first_survivor = self
            .partitions
            .partition_point(|p| p.token_start < erased.end())
            .max(first_stale);
        let state_at_erasure_end = self.partitions[first_survivor - 1].content_type;

        let mut survivors = self.partitions.split_off(first_survivor);
        self.partitions.truncate(first_stale);
        for survivor in &mut survivors {
            survivor.start = update_position(survivor.start, change, Direction::Backward);
            survivor.token_start =
                update_position(survivor.token_start, change, Direction::Backward);
        }
        self.end = document.region().end();

        let mut next_survivor = 0;
        let mut predicted = state_at_erasure_end;
        let (fresh, stopped_at) = Self::scan(
            &self.rules,
            document,
            resume_at.line,
            resume_state,
            |line, state| {
                if line <= inserted.end().line {
                    return false;
                }
                let line_start = Position::bol(line);
                while let Some(survivor) = survivors.get(next_survivor) {
                    if survivor.token_start >= line_start {
                        break;
                    }
                    predicted = survivor.content_type;
                    next_survivor += 1;
                }
                state == predicted
            },
        );

        let fresh_count = fresh.len();
        self.partitions.extend(fresh);
        let changed_end = match stopped_at {
            Some(line) => {
                self.partitions.extend_from_slice(&survivors[next_survivor..]);
                Position::bol(line)
            }
            None => self.end,
        };
        self.verify();

        let changed = Region::new(resume_at, changed_end);
        log::debug!(
            "repartitioned {changed}: {fresh_count} fresh transitions, {}",
            match stopped_at {
                Some(line) => format!("resynchronized at line {line}"),
                None => "scanned to the end".to_string(),
            }
        );
        Some(changed)
    }

    fn install(&mut self, document: &Document) {
        self.attached = true;
        self.resume_state = None;
        self.end = document.region().end();
        let (found, _) = Self::scan(&self.rules, document, 0, DEFAULT_CONTENT, |_, _| false);
        self.partitions.clear();
        self.partitions.push(Partition::SENTINEL);
        self.partitions.extend(found);
        self.verify();
        log::debug!(
            "installed lexical partitioner: {} rules, {} transitions",
            self.rules.len(),
            self.transition_count()
        );
    }

    fn detach(&mut self) {
        self.attached = false;
        self.resume_state = None;
        self.partitions.clear();
        self.partitions.push(Partition::SENTINEL);
        self.end = Position::ZERO;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
