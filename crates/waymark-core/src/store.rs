//! Host state container capability
//!
//! The router talks to application state only through [`Store`]: read the
//! whole state, dispatch a named event with a payload, and register event
//! handlers. A handler may return a partial state which the store merges
//! into the global state key by key.
//!
//! [`EventStore`] is a small in-process implementation with the usual
//! event-store semantics:
//! - handlers run synchronously in registration order
//! - a handler sees the state as left by the handlers before it
//! - handlers may dispatch further events while running
//! - every merged change is announced with [`CHANGED`]

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Whole application state, keyed by module
pub type State = Map<String, Value>;

/// Event handler: `(current state, payload) -> optional state patch`
pub type EventHandler = Rc<dyn Fn(&State, &Value) -> Option<State>>;

/// Wrap a closure as an [`EventHandler`]
pub fn event_handler<F>(f: F) -> EventHandler
where
    F: Fn(&State, &Value) -> Option<State> + 'static,
{
    Rc::new(f)
}

/// Dispatched once after all modules are installed
pub const INIT: &str = "@init";

/// Dispatched after a handler patch was merged; payload is the patch
pub const CHANGED: &str = "@changed";

/// Capabilities the router needs from a state container
pub trait Store {
    /// Snapshot of the current state
    fn get(&self) -> State;

    /// Publish `event` with `payload` to every registered handler
    fn dispatch(&self, event: &str, payload: Value);

    /// Register `handler` for `event`
    fn on(&self, event: &str, handler: EventHandler);
}

/// Single-threaded event store
#[derive(Default)]
pub struct EventStore {
    state: RefCell<State>,
    handlers: RefCell<HashMap<String, Vec<EventHandler>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with some initial state
    pub fn with_state(state: State) -> Self {
        Self {
            state: RefCell::new(state),
            handlers: RefCell::new(HashMap::new()),
        }
    }

    /// Fire [`INIT`]; call once after installing modules
    pub fn init(&self) {
        self.dispatch(INIT, Value::Null);
    }

    /// Register a closure without wrapping it in an `Rc` first
    pub fn on_fn<F>(&self, event: &str, handler: F)
    where
        F: Fn(&State, &Value) -> Option<State> + 'static,
    {
        self.on(event, event_handler(handler));
    }

    /// Number of handlers registered for `event`
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.borrow().get(event).map_or(0, Vec::len)
    }
}

impl Store for EventStore {
    fn get(&self) -> State {
        self.state.borrow().clone()
    }

    fn dispatch(&self, event: &str, payload: Value) {
        // Clone the list so handlers can register or dispatch re-entrantly
        let handlers = match self.handlers.borrow().get(event) {
            Some(handlers) => handlers.clone(),
            None => return,
        };
        trace!("dispatch {} to {} handler(s)", event, handlers.len());

        let mut changes = State::new();
        for handler in handlers {
            let current = self.get();
            if let Some(patch) = handler(&current, &payload) {
                let mut state = self.state.borrow_mut();
                for (key, value) in patch {
                    changes.insert(key.clone(), value.clone());
                    state.insert(key, value);
                }
            }
        }

        if !changes.is_empty() {
            self.dispatch(CHANGED, Value::Object(changes));
        }
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.handlers
            .borrow_mut()
            .entry(event.to_string())
            .or_insert_with(Vec::new)
            .push(handler);
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("state", &self.state.borrow())
            .field(
                "events",
                &self.handlers.borrow().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
