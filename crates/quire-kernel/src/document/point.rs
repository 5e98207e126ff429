//! Live positions anchored to a document.
//!
//! A [`Point`] is registered with its document when created and follows the
//! text around it as the document is edited. The document only holds a weak
//! handle to each point, and each point only holds a weak handle to the
//! document's registry: dropping the document disposes its points, dropping a
//! point unregisters it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::listeners::{ListenerId, Listeners};
use super::{Document, DocumentChange, DocumentId};
use crate::direction::Direction;
use crate::error::{KernelError, Result};
use crate::locations::update_position;
use crate::position::Position;

/// Identifies a point for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u64);

static NEXT_POINT_ID: AtomicU64 = AtomicU64::new(0);

impl PointId {
    fn next() -> Self {
        PointId(NEXT_POINT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Observes the motion of a point.
pub trait PointListener {
    /// The point moved from `from` to `to`, either by [`Point::move_to`] or
    /// because the document changed.
    fn point_moved(&self, point: PointId, from: Position, to: Position);
}

/// Observes the end of a point's life.
pub trait PointLifecycleListener {
    /// The point is being dropped. The point is still registered with its
    /// document while this runs.
    fn point_destroyed(&self, point: PointId);
}

#[derive(Debug)]
struct PointState {
    position: Position,
    gravity: Direction,
    adapts: bool,
}

struct PointShared {
    id: PointId,
    state: RefCell<PointState>,
    motion_listeners: RefCell<Listeners<dyn PointListener>>,
}

impl PointShared {
    /// Stores `to` and tells the motion listeners, if the position changed.
    fn move_to(&self, to: Position) {
        let from = std::mem::replace(&mut self.state.borrow_mut().position, to);
        if from != to {
            let listeners = self.motion_listeners.borrow().snapshot();
            for listener in listeners {
                listener.point_moved(self.id, from, to);
            }
        }
    }
}

/// The document side of the point relationship.
pub(crate) struct PointRegistry {
    document: DocumentId,
    end: Cell<Position>,
    points: RefCell<Vec<Weak<PointShared>>>,
}

impl PointRegistry {
    pub(crate) fn new(document: DocumentId, end: Position) -> Self {
        Self {
            document,
            end: Cell::new(end),
            points: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.points.borrow().len()
    }

    fn register(&self, point: &Rc<PointShared>) {
        self.points.borrow_mut().push(Rc::downgrade(point));
    }

    fn unregister(&self, id: PointId) {
        self.points
            .borrow_mut()
            .retain(|p| p.upgrade().is_some_and(|p| p.id != id));
    }

    fn live_points(&self) -> Vec<Rc<PointShared>> {
        self.points.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    /// Moves every adapting point across `change`. `end` is the end of the
    /// edited document.
    pub(crate) fn document_changed(&self, change: &DocumentChange, end: Position) {
        self.end.set(end);
        for point in self.live_points() {
            let target = {
                let state = point.state.borrow();
                if !state.adapts {
                    continue;
                }
                update_position(state.position, change, state.gravity)
            };
            point.move_to(target);
        }
    }

    /// Moves every adapting point to the beginning of the document.
    pub(crate) fn document_reset(&self, end: Position) {
        self.end.set(end);
        for point in self.live_points() {
            if point.state.borrow().adapts {
                point.move_to(Position::ZERO);
            }
        }
    }
}

/// A position in a document that adjusts itself when the document changes.
pub struct Point {
    shared: Rc<PointShared>,
    registry: Weak<PointRegistry>,
    lifecycle_listeners: Listeners<dyn PointLifecycleListener>,
}

impl Point {
    /// Creates a point at `position` of `document`, with forward gravity.
    pub fn new(document: &Document, position: Position) -> Result<Self> {
        document.buffer().validate(position)?;
        let shared = Rc::new(PointShared {
            id: PointId::next(),
            state: RefCell::new(PointState {
                position,
                gravity: Direction::Forward,
                adapts: true,
            }),
            motion_listeners: RefCell::new(Listeners::new()),
        });
        let registry = document.point_registry();
        registry.register(&shared);
        Ok(Self {
            shared,
            registry: Rc::downgrade(registry),
            lifecycle_listeners: Listeners::new(),
        })
    }

    pub fn id(&self) -> PointId {
        self.shared.id
    }

    /// The document this point belongs to.
    pub fn document(&self) -> Result<DocumentId> {
        self.registry().map(|registry| registry.document)
    }

    pub fn is_document_disposed(&self) -> bool {
        self.registry.strong_count() == 0
    }

    /// The current position. Still readable after disposal.
    pub fn position(&self) -> Position {
        self.shared.state.borrow().position
    }

    /// Moves the point to `to`.
    ///
    /// Only the document end is checked here; a position past the end of a
    /// shorter line is not detected.
    pub fn move_to(&mut self, to: Position) -> Result<()> {
        let registry = self.registry()?;
        if to > registry.end.get() {
            return Err(KernelError::BadPosition(to));
        }
        self.shared.move_to(to);
        Ok(())
    }

    pub fn gravity(&self) -> Direction {
        self.shared.state.borrow().gravity
    }

    pub fn set_gravity(&mut self, gravity: Direction) -> Result<()> {
        self.registry()?;
        self.shared.state.borrow_mut().gravity = gravity;
        Ok(())
    }

    pub fn adapts_to_document(&self) -> bool {
        self.shared.state.borrow().adapts
    }

    /// Sets whether the point follows document edits. A point that does not
    /// adapt keeps its stored position, which may become stale.
    pub fn adapt_to_document(&mut self, adapt: bool) {
        self.shared.state.borrow_mut().adapts = adapt;
    }

    pub fn add_listener(&mut self, listener: Rc<dyn PointListener>) -> Result<ListenerId> {
        self.shared.motion_listeners.borrow_mut().add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Result<()> {
        self.shared.motion_listeners.borrow_mut().remove(id).map(drop)
    }

    pub fn add_lifecycle_listener(
        &mut self,
        listener: Rc<dyn PointLifecycleListener>,
    ) -> Result<ListenerId> {
        self.lifecycle_listeners.add(listener)
    }

    pub fn remove_lifecycle_listener(&mut self, id: ListenerId) -> Result<()> {
        self.lifecycle_listeners.remove(id).map(drop)
    }

    fn registry(&self) -> Result<Rc<PointRegistry>> {
        self.registry.upgrade().ok_or(KernelError::DocumentDisposed)
    }
}

impl Drop for Point {
    fn drop(&mut self) {
        let id = self.shared.id;
        self.lifecycle_listeners.notify(|l| l.point_destroyed(id));
        match self.registry.upgrade() {
            Some(registry) => registry.unregister(id),
            None => log::trace!("dropping point {id:?} of a disposed document"),
        }
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Point")
            .field("id", &self.shared.id)
            .field("position", &state.position)
            .field("gravity", &state.gravity)
            .field("adapts", &state.adapts)
            .field("disposed", &self.is_document_disposed())
            .finish()
    }
}
