use std::rc::Rc;

use crate::error::{KernelError, Result};

/// Subscription handle returned by [`Listeners::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// An ordered list of shared listeners.
///
/// Listeners are notified in registration order. Notification walks a
/// snapshot of the list, so callbacks may add or remove listeners through
/// their own handles without disturbing the round in progress.
pub struct Listeners<L: ?Sized> {
    entries: Vec<(ListenerId, Rc<L>)>,
    next_id: u64,
}

impl<L: ?Sized> Listeners<L> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers `listener`, failing if the same `Rc` is already registered.
    pub fn add(&mut self, listener: Rc<L>) -> Result<ListenerId> {
        if self
            .entries
            .iter()
            .any(|(_, existing)| std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(&listener)))
        {
            return Err(KernelError::ListenerAlreadyRegistered);
        }
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        Ok(id)
    }

    /// Unregisters the listener behind `id` and hands it back.
    pub fn remove(&mut self, id: ListenerId) -> Result<Rc<L>> {
        let index = self
            .entries
            .iter()
            .position(|(existing, _)| *existing == id)
            .ok_or(KernelError::ListenerNotRegistered(id))?;
        Ok(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the registered listeners in notification order.
    pub fn snapshot(&self) -> Vec<Rc<L>> {
        self.entries.iter().map(|(_, l)| Rc::clone(l)).collect()
    }

    /// Calls `f` on every listener registered when the call started.
    pub fn notify(&self, mut f: impl FnMut(&L)) {
        for listener in self.snapshot() {
            f(&listener);
        }
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> std::fmt::Debug for Listeners<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("ids", &self.entries.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .finish()
    }
}
