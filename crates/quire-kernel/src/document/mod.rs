//! The editable document and everything that hangs off it.
//!
//! A [`Document`] owns its text, the registry of live [`Point`]s, its
//! [`Bookmarker`] and an optional [`DocumentPartitioner`]. Every edit runs the
//! same notification cascade before returning:
//!
//! 1. `document_about_to_be_changed`: partitioner, then document listeners.
//! 2. the text is modified and the revision bumped.
//! 3. `document_changed`: points, partitioner, bookmarker, then document
//!    listeners, then partitioning listeners with the changed region.

mod bookmarker;
mod listeners;
mod point;

use std::any::Any;
use std::borrow::Cow;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use bookmarker::{BookmarkListener, Bookmarker};
pub use listeners::{ListenerId, Listeners};
pub use point::{Point, PointId, PointLifecycleListener, PointListener};

use point::PointRegistry;

use crate::error::Result;
use crate::position::{Position, Region};
use crate::rules::{ContentType, DEFAULT_CONTENT};
use crate::text::TextBuffer;

/// One atomic edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChange {
    erased: Region,
    inserted: Region,
}

impl DocumentChange {
    pub fn new(erased: Region, inserted: Region) -> Self {
        debug_assert_eq!(erased.beginning(), inserted.beginning());
        Self { erased, inserted }
    }

    /// The replaced text, in the coordinates before the edit.
    pub fn erased_region(&self) -> Region {
        self.erased
    }

    /// The new text, in the coordinates after the edit.
    pub fn inserted_region(&self) -> Region {
        self.inserted
    }
}

/// A typed region returned by a partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentPartition {
    pub content_type: ContentType,
    pub region: Region,
}

/// Process-unique document identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(0);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Observes edits of a document.
pub trait DocumentListener {
    /// `region` is about to be replaced.
    fn document_about_to_be_changed(&self, _document: &Document, _region: Region) {}

    fn document_changed(&self, document: &Document, change: &DocumentChange);
}

/// Observes changes of a document's partitioning.
pub trait DocumentPartitioningListener {
    fn document_partitioning_changed(&self, document: &Document, changed_region: Region);
}

/// Splits a document into typed partitions.
///
/// The document drives the partitioner: it calls [`install`] when the
/// partitioner is set, forwards every edit, and calls [`detach`] when the
/// partitioner is replaced or taken back.
///
/// [`install`]: DocumentPartitioner::install
/// [`detach`]: DocumentPartitioner::detach
pub trait DocumentPartitioner: Any {
    /// The maximal partition containing `at`, which is a valid position.
    fn partition(&self, at: Position) -> DocumentPartition;

    fn document_about_to_be_changed(&mut self, document: &Document, region: Region);

    /// Updates the partitioning and returns the region whose partitioning
    /// changed, if any.
    fn document_changed(&mut self, document: &Document, change: &DocumentChange) -> Option<Region>;

    /// Computes the partitioning of the whole document.
    fn install(&mut self, document: &Document);

    fn detach(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A text document with live points, bookmarks and partitioning.
pub struct Document {
    id: DocumentId,
    buffer: TextBuffer,
    revision: u64,
    points: Rc<PointRegistry>,
    listeners: Listeners<dyn DocumentListener>,
    partitioning_listeners: Listeners<dyn DocumentPartitioningListener>,
    bookmarker: Option<Bookmarker>,
    partitioner: Option<Box<dyn DocumentPartitioner>>,
}

impl Document {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        let id = DocumentId::next();
        let buffer = TextBuffer::from_text(text);
        let points = Rc::new(PointRegistry::new(id, buffer.end()));
        Self {
            id,
            buffer,
            revision: 0,
            points,
            listeners: Listeners::new(),
            partitioning_listeners: Listeners::new(),
            bookmarker: None,
            partitioner: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Incremented by every edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn number_of_lines(&self) -> usize {
        self.buffer.number_of_lines()
    }

    pub fn line(&self, line: usize) -> Result<Cow<'_, str>> {
        self.buffer.line(line)
    }

    /// The region spanning the whole document.
    pub fn region(&self) -> Region {
        self.buffer.region()
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Replaces `region` with `text` and returns the end of the inserted text.
    pub fn replace(&mut self, region: Region, text: &str) -> Result<Position> {
        self.buffer.validate_region(region)?;

        if let Some(mut partitioner) = self.partitioner.take() {
            partitioner.document_about_to_be_changed(self, region);
            self.partitioner = Some(partitioner);
        }
        for listener in self.listeners.snapshot() {
            listener.document_about_to_be_changed(self, region);
        }

        let (erased, inserted) = self.buffer.replace(region, text)?;
        self.revision += 1;
        let change = DocumentChange::new(erased, inserted);

        self.points.document_changed(&change, self.buffer.end());
        let changed_partitioning = match self.partitioner.take() {
            Some(mut partitioner) => {
                let changed = partitioner.document_changed(self, &change);
                self.partitioner = Some(partitioner);
                changed
            }
            None => None,
        };
        if let Some(bookmarker) = &mut self.bookmarker {
            bookmarker.document_changed(&change, self.buffer.number_of_lines());
        }
        for listener in self.listeners.snapshot() {
            listener.document_changed(self, &change);
        }
        if let Some(changed) = changed_partitioning {
            self.notify_partitioning_changed(changed);
        }
        Ok(inserted.end())
    }

    pub fn insert(&mut self, at: Position, text: &str) -> Result<Position> {
        self.replace(Region::empty_at(at), text)
    }

    pub fn erase(&mut self, region: Region) -> Result<()> {
        self.replace(region, "").map(drop)
    }

    /// Replaces the whole content. Adapting points move to the beginning,
    /// bookmarks are cleared and the partitioning is recomputed.
    pub fn reset_content(&mut self, text: &str) {
        let old = self.region();
        for listener in self.listeners.snapshot() {
            listener.document_about_to_be_changed(self, old);
        }

        self.buffer = TextBuffer::from_text(text);
        self.revision += 1;
        let change = DocumentChange::new(old, self.region());

        self.points.document_reset(self.buffer.end());
        if let Some(mut partitioner) = self.partitioner.take() {
            partitioner.install(self);
            self.partitioner = Some(partitioner);
        }
        if let Some(bookmarker) = &mut self.bookmarker {
            bookmarker.document_reset(self.buffer.number_of_lines());
        }
        for listener in self.listeners.snapshot() {
            listener.document_changed(self, &change);
        }
        if self.partitioner.is_some() {
            self.notify_partitioning_changed(self.region());
        }
    }

    pub fn add_listener(&mut self, listener: Rc<dyn DocumentListener>) -> Result<ListenerId> {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Result<()> {
        self.listeners.remove(id).map(drop)
    }

    pub fn add_partitioning_listener(
        &mut self,
        listener: Rc<dyn DocumentPartitioningListener>,
    ) -> Result<ListenerId> {
        self.partitioning_listeners.add(listener)
    }

    pub fn remove_partitioning_listener(&mut self, id: ListenerId) -> Result<()> {
        self.partitioning_listeners.remove(id).map(drop)
    }

    /// The document's bookmarks, created on first use.
    pub fn bookmarker(&mut self) -> &mut Bookmarker {
        let lines = self.buffer.number_of_lines();
        self.bookmarker.get_or_insert_with(|| Bookmarker::new(lines))
    }

    /// The bookmarks, if [`Document::bookmarker`] was ever called.
    pub fn bookmarks(&self) -> Option<&Bookmarker> {
        self.bookmarker.as_ref()
    }

    /// Installs `partitioner`, detaching and returning the previous one.
    pub fn set_partitioner(
        &mut self,
        mut partitioner: Box<dyn DocumentPartitioner>,
    ) -> Option<Box<dyn DocumentPartitioner>> {
        let previous = self.take_partitioner();
        partitioner.install(self);
        self.partitioner = Some(partitioner);
        self.notify_partitioning_changed(self.region());
        previous
    }

    /// Detaches the partitioner. The document then reports all its text as
    /// [`DEFAULT_CONTENT`].
    pub fn take_partitioner(&mut self) -> Option<Box<dyn DocumentPartitioner>> {
        let mut partitioner = self.partitioner.take()?;
        partitioner.detach();
        Some(partitioner)
    }

    pub fn partitioner<P: DocumentPartitioner>(&self) -> Option<&P> {
        self.partitioner.as_ref()?.as_any().downcast_ref::<P>()
    }

    pub fn partitioner_mut<P: DocumentPartitioner>(&mut self) -> Option<&mut P> {
        self.partitioner.as_mut()?.as_any_mut().downcast_mut::<P>()
    }

    /// The partition containing `at`.
    pub fn partition(&self, at: Position) -> Result<DocumentPartition> {
        self.buffer.validate(at)?;
        Ok(match &self.partitioner {
            Some(partitioner) => partitioner.partition(at),
            None => DocumentPartition {
                content_type: DEFAULT_CONTENT,
                region: self.region(),
            },
        })
    }

    /// Every partition of the document, in order.
    pub fn partitions(&self) -> Vec<DocumentPartition> {
        let Some(partitioner) = &self.partitioner else {
            return vec![DocumentPartition {
                content_type: DEFAULT_CONTENT,
                region: self.region(),
            }];
        };
        let end = self.buffer.end();
        let mut partitions = Vec::new();
        let mut at = Position::ZERO;
        loop {
            let partition = partitioner.partition(at);
            let next = partition.region.end();
            partitions.push(partition);
            if next >= end || next <= at {
                return partitions;
            }
            at = next;
        }
    }

    pub(crate) fn point_registry(&self) -> &Rc<PointRegistry> {
        &self.points
    }

    fn notify_partitioning_changed(&self, changed: Region) {
        for listener in self.partitioning_listeners.snapshot() {
            listener.document_partitioning_changed(self, changed);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        let points = self.points.len();
        if points > 0 {
            log::trace!("disposing document {:?} with {points} points", self.id);
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("revision", &self.revision)
            .field("buffer", &self.buffer)
            .field("bookmarks", &self.bookmarker)
            .field("partitioned", &self.partitioner.is_some())
            .finish()
    }
}
