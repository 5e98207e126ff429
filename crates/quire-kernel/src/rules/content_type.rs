use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// First id handed out by [`ContentType::new_value`]. Everything below is reserved.
const FIRST_DYNAMIC_ID: u64 = 100;

static NEXT_ID: AtomicU64 = AtomicU64::new(FIRST_DYNAMIC_ID);

/// Opaque, totally ordered tag naming the kind of a partition.
///
/// The ordering is meaningful to transition rules: entering a content type
/// with a greater id is treated as entering a nested kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentType(u64);

/// Content that no rule has claimed.
pub const DEFAULT_CONTENT: ContentType = ContentType(0);
/// Content that belongs to the enclosing partitioning.
pub const PARENT_CONTENT: ContentType = ContentType(1);
/// Content whose type has not been computed.
pub const UNDETERMINED_CONTENT: ContentType = ContentType(2);

impl ContentType {
    /// Allocates a fresh content type. Ids are process-wide, strictly
    /// increasing and never reused.
    pub fn new_value() -> Self {
        ContentType(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// True for the reserved ids `0..=99`.
    pub fn is_special(self) -> bool {
        self.0 < FIRST_DYNAMIC_ID
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl Default for ContentType {
    fn default() -> Self {
        DEFAULT_CONTENT
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DEFAULT_CONTENT => f.write_str("default"),
            PARENT_CONTENT => f.write_str("parent"),
            UNDETERMINED_CONTENT => f.write_str("undetermined"),
            ContentType(id) => write!(f, "#{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_values_are_special() {
        assert!(DEFAULT_CONTENT.is_special());
        assert!(PARENT_CONTENT.is_special());
        assert!(UNDETERMINED_CONTENT.is_special());
        assert!(!ContentType::new_value().is_special());
    }

    #[test]
    fn new_values_increase_and_never_repeat() {
        let a = ContentType::new_value();
        let b = ContentType::new_value();
        let c = ContentType::new_value();
        assert!(a < b && b < c);
        assert!(a.id() >= 100);
    }

    #[test]
    fn display_names() {
        assert_eq!(DEFAULT_CONTENT.to_string(), "default");
        assert_eq!(PARENT_CONTENT.to_string(), "parent");
        let fresh = ContentType::new_value();
        assert_eq!(fresh.to_string(), format!("#{}", fresh.id()));
    }
}
