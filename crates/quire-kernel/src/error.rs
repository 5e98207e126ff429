use crate::document::ListenerId;
use crate::position::{Position, Region};
use crate::rules::ContentType;

/// Errors raised by the document kernel.
///
/// None of these are transient: every variant is either a contract violation
/// by the caller or a use of a point after its document went away.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("The document the object is connected to has already been disposed")]
    DocumentDisposed,
    #[error("Position {0} is outside of the document")]
    BadPosition(Position),
    #[error("Region {0} is outside of the document")]
    BadRegion(Region),
    #[error("Illegal state: {0}")]
    IllegalState(&'static str),
    #[error("The listener is already registered")]
    ListenerAlreadyRegistered,
    #[error("No listener is registered as {0:?}")]
    ListenerNotRegistered(ListenerId),
    #[error("A transition rule must change the content type ({from} -> {to})")]
    InvalidRule { from: ContentType, to: ContentType },
    #[error("Invalid transition pattern: {0}")]
    PatternSyntax(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, KernelError>;
