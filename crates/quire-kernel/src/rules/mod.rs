//! Content types, transition rules and the lexical partitioner built on them.

mod content_type;
mod partitioner;
mod transition;

pub use content_type::{ContentType, DEFAULT_CONTENT, PARENT_CONTENT, UNDETERMINED_CONTENT};
pub use partitioner::LexicalPartitioner;
pub use transition::{Matcher, TokenBias, TransitionMatch, TransitionRule};

#[cfg(test)]
mod tests;
