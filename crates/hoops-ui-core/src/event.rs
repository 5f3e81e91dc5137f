//! Typed observer lists for service events.
//!
//! Every service owns an [`EventEmitter`] for its own event enum. Listeners are
//! plain closures; subscribing returns a [`Subscription`] that removes the
//! listener when it is dropped or explicitly unsubscribed.

use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<dyn Fn(&E)>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

/// A single-threaded list of event listeners.
///
/// Cloning an emitter shares the listener list.
pub struct EventEmitter<E> {
    listeners: Rc<RefCell<Listeners<E>>>,
}

impl<E: 'static> EventEmitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener. It stays registered while the returned
    /// subscription is alive.
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Listeners<E>>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Notify every listener, in subscription order.
    ///
    /// Listeners are snapshotted first, so a listener may subscribe or
    /// unsubscribe while being notified.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.borrow().entries.len())
            .finish()
    }
}

/// Disposer for a registered listener.
#[must_use = "dropping a Subscription removes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered for the emitter's whole lifetime.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// An event dispatched by a service.
pub trait ServiceEvent: fmt::Debug {
    /// Event name, e.g. `hoops-explode-magnitude-changed`.
    fn name(&self) -> &'static str;

    /// Event payload.
    fn detail(&self) -> Value;
}

/// Collects every event an emitter dispatches.
///
/// Used mostly by tests.
pub struct EventLog<E> {
    events: Rc<RefCell<Vec<E>>>,
    _subscription: Subscription,
}

impl<E: Clone + 'static> EventLog<E> {
    /// Start recording events from `emitter`.
    pub fn attach(emitter: &EventEmitter<E>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription =
            emitter.subscribe(move |event: &E| sink.borrow_mut().push(event.clone()));
        Self {
            events,
            _subscription: subscription,
        }
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<E> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl<E: ServiceEvent + Clone + 'static> EventLog<E> {
    /// Names of the recorded events, oldest first.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(ServiceEvent::name).collect()
    }
}
