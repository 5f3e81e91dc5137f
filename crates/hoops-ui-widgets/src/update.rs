//! Re-render requests raised by service events.

use hoops_ui_core::{EventEmitter, Subscription};
use std::cell::Cell;
use std::rc::Rc;

/// A shared "needs update" flag.
///
/// Clones share the flag, so an event listener can hold one clone while the
/// component hands out another to its host.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pending: Rc<Cell<u32>>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for an update. Requests are counted until taken.
    pub fn request(&self) {
        self.pending.set(self.pending.get().saturating_add(1));
    }

    pub fn is_requested(&self) -> bool {
        self.pending.get() > 0
    }

    /// Clear the flag, returning whether an update was requested.
    pub fn take(&self) -> bool {
        self.pending.replace(0) > 0
    }

    /// Requests raised since the last [`UpdateRequest::take`].
    pub fn count(&self) -> u32 {
        self.pending.get()
    }

    /// Request an update for every event of `emitter` that `relevant` accepts.
    pub fn watch<E: 'static>(
        &self,
        emitter: &EventEmitter<E>,
        relevant: impl Fn(&E) -> bool + 'static,
    ) -> Subscription {
        let update = self.clone();
        emitter.subscribe(move |event| {
            if relevant(event) {
                update.request();
            }
        })
    }
}
