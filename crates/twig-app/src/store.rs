//! Reactive store
//!
//! State is a JSON object. Every update builds a new object from the current
//! one plus the partial update and swaps it in whole, so a snapshot handed
//! out by [`Store::get_state`] never changes underneath its reader.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Application state
pub type State = Map<String, Value>;

type Listener = Rc<dyn Fn()>;

struct Inner {
    state: RefCell<Rc<State>>,
    listeners: RefCell<Vec<Listener>>,
}

/// Shared handle to application state
#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

impl Store {
    pub fn new(initial: State) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(Rc::new(initial)),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Current snapshot
    pub fn get_state(&self) -> Rc<State> {
        self.inner.state.borrow().clone()
    }

    /// Merge the top-level keys of `partial` into the state, then notify
    ///
    /// Anything but a JSON object is ignored.
    pub fn set_state(&self, partial: impl Into<Value>) {
        let Value::Object(partial) = partial.into() else {
            tracing::warn!("set_state ignored: partial update is not an object");
            return;
        };

        let mut next = State::clone(&self.get_state());
        next.extend(partial);
        *self.inner.state.borrow_mut() = Rc::new(next);

        self.notify();
    }

    /// Add a listener, called after every update in registration order
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        // Listeners may update or subscribe while being notified
        let listeners = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(State::new())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
