//! Navigation synchronizer
//!
//! Keeps three things in step: the route state published in the store, the
//! history stack, and the visible location. Every trigger produces exactly
//! one transition:
//!
//! | Trigger | History | State | [`ROUTER_CHANGED`] |
//! |---|---|---|---|
//! | store init | untouched | resolved from `pathname` | no |
//! | [`ROUTER_NAVIGATE`] / link click | pushed if the path differs | resolved | yes |
//! | back/forward | untouched (browser owns it) | resolved if the path differs | if the path differs |
//!
//! A transition either completes or leaves everything as it was. The route is
//! resolved before history is touched, so a failing handler pushes nothing,
//! and a rejected push publishes nothing. [`Navigator::navigate`] returns the
//! failure; failures of store-driven transitions (`@init`, a host dispatching
//! [`ROUTER_NAVIGATE`] itself) are kept for [`Navigator::take_error`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use serde_json::json;
//! use waymark_core::{create_router, EventStore, MemoryHistory, Route};
//!
//! let store = Rc::new(EventStore::new());
//! let history = Rc::new(MemoryHistory::new("/blog/post/hello"));
//!
//! let navigator = create_router(vec![
//!     Route::new("/").unwrap().payload(json!({"page": "home"})),
//!     Route::new("/blog/post/*").unwrap().handler(|params| json!(params[0])),
//! ])
//! .install(store.clone(), history.clone());
//! store.init();
//!
//! assert_eq!(navigator.current().unwrap().matched, json!("hello"));
//!
//! navigator.navigate("/").unwrap();
//! assert_eq!(history.entries(), vec!["/blog/post/hello", "/"]);
//! ```

use crate::history::History;
use crate::link::{should_intercept, LinkClick};
use crate::route::{resolve, Route, RouteState};
use crate::store::{event_handler, State, Store, INIT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Request navigation; payload is the target path as a string
pub const ROUTER_NAVIGATE: &str = "@router/navigate";

/// Announces a route transition; payload is the new [`RouteState`]
pub const ROUTER_CHANGED: &str = "@router/changed";

/// State key holding the current [`RouteState`]
pub const ROUTER_KEY: &str = "route";

/// Replace the route state; payload is the resolved [`RouteState`]
///
/// Dispatched by the router itself. Hosts use [`ROUTER_NAVIGATE`] instead,
/// which also keeps history in step.
pub const ROUTER_CHANGE: &str = "@router/change";

/// Failure left behind by a handler running inside a dispatch
type Failure = Rc<RefCell<Option<Error>>>;

/// Router options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Anchor attribute that opts a link out of interception
    pub ignore_attribute: String,
    /// Route in-page link clicks internally
    pub intercept_links: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ignore_attribute: "data-ignore-router".to_string(),
            intercept_links: true,
        }
    }
}

/// Build a router module from routes in precedence order
pub fn create_router(routes: Vec<Route>) -> RouterModule {
    RouterModule {
        routes: routes.into(),
        config: RouterConfig::default(),
    }
}

/// A router ready to be installed into a store
#[derive(Debug, Clone)]
pub struct RouterModule {
    routes: Rc<[Route]>,
    config: RouterConfig,
}

impl RouterModule {
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the router's handlers on `store`
    ///
    /// Nothing is resolved until the store dispatches [`INIT`].
    pub fn install<S, H>(self, store: Rc<S>, history: Rc<H>) -> Navigator<S>
    where
        S: Store + 'static,
        H: History + 'static,
    {
        let history: Rc<dyn History> = history;
        let failure: Failure = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&store);

        {
            let weak = weak.clone();
            let history = history.clone();
            let routes = self.routes.clone();
            let failure = failure.clone();
            store.on(
                INIT,
                event_handler(move |_, _| {
                    if let Some(store) = weak.upgrade() {
                        let path = history.pathname();
                        debug!("Initial route {}", path);
                        let committed = resolve(&path, &routes).and_then(|r| commit(&*store, &r));
                        if let Err(e) = committed {
                            warn!("Initial route {} failed: {}", path, e);
                            *failure.borrow_mut() = Some(e);
                        }
                    }
                    None
                }),
            );
        }

        {
            let history = history.clone();
            let routes = self.routes.clone();
            let failure = failure.clone();
            store.on(
                ROUTER_NAVIGATE,
                event_handler(move |state, payload| {
                    let store = weak.upgrade()?;
                    let Some(path) = payload.as_str() else {
                        warn!("Ignoring navigation to non-string path {}", payload);
                        return None;
                    };

                    let push = current_path(state).as_deref() != Some(path);
                    if let Err(e) = transition(&*store, &*history, &routes, path, push) {
                        warn!("Navigation to {} aborted: {}", path, e);
                        *failure.borrow_mut() = Some(e);
                    }
                    None
                }),
            );
        }

        store.on(
            ROUTER_CHANGE,
            event_handler(move |_, payload| {
                if let Err(e) = serde_json::from_value::<RouteState>(payload.clone()) {
                    warn!("Malformed route change payload: {}", e);
                    return None;
                }
                let mut patch = State::new();
                patch.insert(ROUTER_KEY.to_string(), payload.clone());
                Some(patch)
            }),
        );

        Navigator {
            store,
            history,
            routes: self.routes,
            config: self.config,
            failure,
        }
    }
}

/// Handle onto an installed router
///
/// The environment forwards clicks and back/forward notifications here;
/// application code navigates and reads the current route.
pub struct Navigator<S: Store> {
    store: Rc<S>,
    history: Rc<dyn History>,
    routes: Rc<[Route]>,
    config: RouterConfig,
    failure: Failure,
}

impl<S: Store + 'static> Navigator<S> {
    /// Explicit navigation to `path`
    ///
    /// On error neither history nor the route state changed.
    pub fn navigate(&self, path: &str) -> Result<()> {
        *self.failure.borrow_mut() = None;
        self.store
            .dispatch(ROUTER_NAVIGATE, Value::String(path.to_string()));
        match self.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Back/forward traversal happened; the location already changed
    pub fn handle_popstate(&self) -> Result<()> {
        let path = self.history.pathname();
        if current_path(&self.store.get()).as_deref() == Some(path.as_str()) {
            return Ok(());
        }

        debug!("History moved to {}", path);
        transition(&*self.store, &*self.history, &self.routes, &path, false)
    }

    /// Route a link click internally if it qualifies
    ///
    /// `Ok(true)` means the caller must suppress the default action. After an
    /// error the default action should proceed, so the browser loads the link.
    pub fn handle_click(&self, click: &LinkClick) -> Result<bool> {
        if !self.config.intercept_links {
            return Ok(false);
        }
        match should_intercept(click, &self.history.origin()) {
            Some(path) => {
                debug!("Intercepted link to {}", path);
                self.navigate(&path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Current published route, `None` before the store was initialized
    pub fn current(&self) -> Option<RouteState> {
        let state = self.store.get();
        let value = state.get(ROUTER_KEY)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Resolve `path` without publishing anything
    pub fn resolve(&self, path: &str) -> Result<RouteState> {
        resolve(path, &self.routes)
    }

    /// Take the failure of the last store-driven transition, if any
    pub fn take_error(&self) -> Option<Error> {
        self.failure.take()
    }

    /// Call `f` with the new route after every transition
    pub fn on_change<F>(&self, f: F)
    where
        F: Fn(&RouteState) + 'static,
    {
        self.store.on(
            ROUTER_CHANGED,
            event_handler(move |_, payload| {
                match serde_json::from_value::<RouteState>(payload.clone()) {
                    Ok(route) => f(&route),
                    Err(e) => warn!("Malformed route changed payload: {}", e),
                }
                None
            }),
        );
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn store(&self) -> &Rc<S> {
        &self.store
    }
}

impl<S: Store> std::fmt::Debug for Navigator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("routes_count", &self.routes.len())
            .field("config", &self.config)
            .finish()
    }
}

fn current_path(state: &State) -> Option<String> {
    state
        .get(ROUTER_KEY)?
        .get("path")?
        .as_str()
        .map(str::to_string)
}

/// Resolve, optionally push, then publish and announce
///
/// Nothing is pushed or published unless every earlier step succeeded.
fn transition<S: Store + ?Sized>(
    store: &S,
    history: &dyn History,
    routes: &[Route],
    path: &str,
    push: bool,
) -> Result<()> {
    let route = resolve(path, routes)?;
    if push {
        debug!("Pushing history entry {}", path);
        history.push(path)?;
    }
    commit(store, &route)?;
    announce(store);
    Ok(())
}

/// Ask the store to replace the route state
fn commit<S: Store + ?Sized>(store: &S, route: &RouteState) -> Result<()> {
    let payload = serde_json::to_value(route).map_err(|e| Error::EncodeError(e.to_string()))?;
    store.dispatch(ROUTER_CHANGE, payload);
    Ok(())
}

fn announce<S: Store + ?Sized>(store: &S) {
    let route = store.get().get(ROUTER_KEY).cloned().unwrap_or(Value::Null);
    store.dispatch(ROUTER_CHANGED, route);
}
