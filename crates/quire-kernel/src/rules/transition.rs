use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::content_type::ContentType;
use crate::error::Result;

/// Which partition a matched transition token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenBias {
    /// The token opens the destination partition (e.g. `/*` starts a comment).
    Destination,
    /// The token closes the source partition (e.g. `*/` ends a comment).
    Source,
}

/// A successful [`TransitionRule::matches`] result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionMatch {
    /// Length of the token in bytes; always at least 1. A zero-width match
    /// covers the next character, or counts as 1 at the end of the line.
    pub length: usize,
    pub bias: TokenBias,
}

/// How a rule recognizes its token.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal {
        pattern: String,
        escape: Option<char>,
        case_sensitive: bool,
    },
    Regex(Regex),
}

/// A rule that switches the content type from `content_type` to
/// `destination` when its token is found.
#[derive(Debug, Clone)]
pub struct TransitionRule {
    content_type: ContentType,
    destination: ContentType,
    matcher: Matcher,
    bias: TokenBias,
}

impl TransitionRule {
    /// Creates a literal rule. An empty `pattern` matches at the end of a line.
    pub fn literal(
        content_type: ContentType,
        destination: ContentType,
        pattern: impl Into<String>,
        escape: Option<char>,
        case_sensitive: bool,
    ) -> Self {
        Self::with_matcher(
            content_type,
            destination,
            Matcher::Literal {
                pattern: pattern.into(),
                escape,
                case_sensitive,
            },
        )
    }

    /// Creates a regular expression rule.
    ///
    /// The expression sees the whole line, so anchors and word boundaries
    /// behave as they would on the full line text.
    pub fn regex(
        content_type: ContentType,
        destination: ContentType,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self::with_matcher(
            content_type,
            destination,
            Matcher::Regex(regex),
        ))
    }

    fn with_matcher(content_type: ContentType, destination: ContentType, matcher: Matcher) -> Self {
        let bias = if destination > content_type {
            TokenBias::Destination
        } else {
            TokenBias::Source
        };
        Self {
            content_type,
            destination,
            matcher,
            bias,
        }
    }

    /// Overrides which side of the boundary the token belongs to.
    #[must_use]
    pub fn with_bias(mut self, bias: TokenBias) -> Self {
        self.bias = bias;
        self
    }

    /// The content type this rule transitions from.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The content type this rule transitions to.
    pub fn destination(&self) -> ContentType {
        self.destination
    }

    pub fn bias(&self) -> TokenBias {
        self.bias
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Tries to match the rule's token at byte `offset` of `line`.
    ///
    /// `line` excludes the line separator; `offset == line.len()` is the end
    /// of the line.
    pub fn matches(&self, line: &str, offset: usize) -> Option<TransitionMatch> {
        self.matches_with(line, offset, &mut MatchCursor::default())
    }

    /// Like [`TransitionRule::matches`], reusing `cursor` across calls with
    /// increasing offsets on the same line.
    ///
    /// A regex rule searches the line once and then answers every offset up
    /// to the match it found without searching again.
    pub(crate) fn matches_with(
        &self,
        line: &str,
        offset: usize,
        cursor: &mut MatchCursor,
    ) -> Option<TransitionMatch> {
        if !line.is_char_boundary(offset) {
            return None;
        }
        let length = match &self.matcher {
            Matcher::Literal {
                pattern,
                escape,
                case_sensitive,
            } => match_literal(line, offset, pattern, *escape, *case_sensitive)?,
            Matcher::Regex(regex) => {
                let stale = match cursor.next {
                    _ if !cursor.searched => true,
                    Some((start, _)) => start < offset,
                    None => false,
                };
                if stale {
                    cursor.searched = true;
                    cursor.next = regex.find_at(line, offset).map(|m| (m.start(), m.end()));
                }
                let (start, end) = cursor.next?;
                if start != offset {
                    return None;
                }
                if start == end {
                    // consume one character so the scan moves on
                    line[offset..].chars().next().map_or(1, char::len_utf8)
                } else {
                    end - start
                }
            }
        };
        Some(TransitionMatch {
            length,
            bias: self.bias,
        })
    }
}

/// The next match of a regex rule on the line being scanned.
///
/// Valid for one line and non-decreasing offsets. The leftmost match found
/// from an earlier offset is also the match `find_at` reports for every
/// offset up to its start.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MatchCursor {
    searched: bool,
    next: Option<(usize, usize)>,
}

fn match_literal(
    line: &str,
    offset: usize,
    pattern: &str,
    escape: Option<char>,
    case_sensitive: bool,
) -> Option<usize> {
    if escape.is_some_and(|escape| is_escaped(&line[..offset], escape)) {
        return None;
    }

    let rest = &line[offset..];
    if pattern.is_empty() {
        return rest.is_empty().then_some(1);
    }
    if case_sensitive {
        return rest.starts_with(pattern).then_some(pattern.len());
    }

    // Case-insensitive: walk both strings char by char and report how many
    // bytes of the line were consumed.
    let mut wanted = pattern.chars().flat_map(char::to_lowercase);
    let mut consumed = 0;
    let mut pending = Vec::new();
    for c in rest.chars() {
        pending.clear();
        pending.extend(c.to_lowercase());
        for lower in &pending {
            if wanted.next() != Some(*lower) {
                return None;
            }
        }
        consumed += c.len_utf8();
        if wanted.clone().next().is_none() {
            return Some(consumed);
        }
    }
    None
}

/// True when an odd number of `escape` characters end `before`.
fn is_escaped(before: &str, escape: char) -> bool {
    before.chars().rev().take_while(|&c| c == escape).count() % 2 == 1
}
