//! Observer registry for session changes.
//!
//! DESIGN
//! ======
//! Views subscribe to one of two signals and are called synchronously, in
//! registration order, every time the session store emits that signal.
//! Emission is at-least-once per state change: nothing is deduplicated or
//! coalesced. A panicking listener is logged and skipped so the emitter and
//! the remaining listeners are unaffected.
//!
//! Panic isolation relies on unwinding. `wasm32-unknown-unknown` builds abort
//! on panic, so in the browser a listener must not panic; report failures
//! through `tracing` instead.
//!
//! Listeners may subscribe, unsubscribe, or touch the session from inside a
//! callback; the listener list is snapshotted before dispatch.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use super::session::ActingAs;

/// Signal names a listener can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionSignal {
    UserDetailsChanged,
    ActingAsSwitched,
}

/// Payload delivered to listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Cached profile replaced or cleared.
    UserDetailsChanged,
    /// Acting-as identity set (possibly to the same value).
    ActingAsSwitched(ActingAs),
}

impl SessionEvent {
    #[must_use]
    pub fn signal(&self) -> SessionSignal {
        match self {
            Self::UserDetailsChanged => SessionSignal::UserDetailsChanged,
            Self::ActingAsSwitched(_) => SessionSignal::ActingAsSwitched,
        }
    }
}

/// Handle returned by `subscribe`; pass it to `unsubscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    signal: SessionSignal,
}

impl Subscription {
    pub fn signal(&self) -> SessionSignal {
        self.signal
    }
}

type Listener = Rc<dyn Fn(&SessionEvent)>;

#[derive(Default)]
pub struct Notifier {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(Subscription, Listener)>>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").field("listeners", &self.listeners.borrow().len()).finish()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, signal: SessionSignal, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let subscription = Subscription { id, signal };
        self.listeners.borrow_mut().push((subscription, Rc::new(listener)));
        subscription
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(s, _)| *s != subscription);
        listeners.len() != before
    }

    pub fn listener_count(&self, signal: SessionSignal) -> usize {
        self.listeners.borrow().iter().filter(|(s, _)| s.signal == signal).count()
    }

    /// Deliver `event` to every listener of its signal. Returns how many
    /// listeners completed without panicking. Panics are only caught where
    /// the target unwinds.
    pub fn emit(&self, event: &SessionEvent) -> usize {
        let signal = event.signal();
        let targets: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(s, _)| s.signal == signal)
            .map(|(_, l)| Rc::clone(l))
            .collect();

        let mut delivered = 0;
        for listener in targets {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_ok() {
                delivered += 1;
            } else {
                tracing::error!(?signal, "session listener panicked; continuing");
            }
        }
        tracing::trace!(?signal, delivered, "session signal emitted");
        delivered
    }
}
