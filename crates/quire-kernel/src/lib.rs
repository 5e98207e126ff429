pub mod direction;
pub mod document;
pub mod error;
pub mod locations;
pub mod position;
pub mod rules;
pub mod text;

// Re-export key types for easier usage
pub use direction::Direction;
pub use document::{
    BookmarkListener, Bookmarker, Document, DocumentChange, DocumentId, DocumentListener,
    DocumentPartition, DocumentPartitioner, DocumentPartitioningListener, ListenerId, Point,
    PointId, PointLifecycleListener, PointListener,
};
pub use error::{KernelError, Result};
pub use locations::update_position;
pub use position::{Position, Region};
pub use rules::{
    ContentType, DEFAULT_CONTENT, LexicalPartitioner, PARENT_CONTENT, TokenBias, TransitionRule,
    UNDETERMINED_CONTENT,
};
pub use text::TextBuffer;
