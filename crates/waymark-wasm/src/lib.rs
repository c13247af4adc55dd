//! Waymark WebAssembly bindings
//!
//! Runs the waymark router in the browser: the current location is read from
//! `window.location`, explicit navigations push onto `window.history`,
//! in-page link clicks are intercepted on `document.documentElement`, and
//! `popstate` drives back/forward transitions.
//!
//! ```js
//! import init, { WaymarkRouter } from 'waymark-wasm';
//!
//! await init();
//! const router = new WaymarkRouter([
//!   ['/', () => ({ page: 'home' })],
//!   ['/blog/post/*', id => ({ page: 'post', id })],
//!   [/^blog\/post\/(\d+)\/(\d+)$/, (year, month) => ({ page: 'post', year, month })],
//! ]);
//! router.onChange(route => render(route.match));
//! ```
//!
//! `navigate`, `resolve` and the constructor throw when a route handler throws
//! or the browser refuses the history entry; the route state is then left as
//! it was. Failures inside DOM listeners are reported on the console, and a
//! link whose navigation failed is followed by the browser as usual.

pub mod convert;
pub mod history;
pub mod regexp;

pub use history::BrowserHistory;

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use waymark_core::{
    create_router, event_handler, EventStore, LinkClick, Navigator, RouterConfig, Store,
    ROUTER_CHANGED, ROUTER_KEY, ROUTER_NAVIGATE,
};
use web_sys::{console, Element, Event, HtmlAnchorElement, MouseEvent};

use convert::{js_to_json, routes_from_js, to_js, to_js_error};

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();
}

/// Event name for navigation requests dispatched on the store
#[wasm_bindgen(js_name = routerNavigate)]
pub fn router_navigate() -> String {
    ROUTER_NAVIGATE.to_string()
}

/// Event name announcing route transitions
#[wasm_bindgen(js_name = routerChanged)]
pub fn router_changed() -> String {
    ROUTER_CHANGED.to_string()
}

/// State key holding the current route
#[wasm_bindgen(js_name = routerKey)]
pub fn router_key() -> String {
    ROUTER_KEY.to_string()
}

/// Browser router bound to its own event store
#[wasm_bindgen]
pub struct WaymarkRouter {
    store: Rc<EventStore>,
    navigator: Rc<Navigator<EventStore>>,
    history: BrowserHistory,
    root: Option<Element>,
    on_click: Option<Closure<dyn FnMut(MouseEvent)>>,
    on_popstate: Option<Closure<dyn FnMut(Event)>>,
}

#[wasm_bindgen]
impl WaymarkRouter {
    /// Create a router from `[[pattern, handler?], ...]` and an optional config
    #[wasm_bindgen(constructor)]
    pub fn new(routes: js_sys::Array, config: JsValue) -> Result<WaymarkRouter, JsValue> {
        let routes = routes_from_js(&routes)?;
        let config: RouterConfig = if config.is_undefined() || config.is_null() {
            RouterConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let history = BrowserHistory::new()?;
        let store = Rc::new(EventStore::new());
        let navigator = Rc::new(
            create_router(routes)
                .with_config(config)
                .install(store.clone(), Rc::new(history.clone())),
        );

        let mut router = WaymarkRouter {
            store,
            navigator,
            history,
            root: None,
            on_click: None,
            on_popstate: None,
        };

        router.attach()?;
        router.store.init();
        if let Some(e) = router.navigator.take_error() {
            return Err(to_js_error(e));
        }

        Ok(router)
    }

    /// Navigate to `path`, pushing a history entry if it differs
    pub fn navigate(&self, path: &str) -> Result<(), JsValue> {
        self.navigator.navigate(path).map_err(to_js_error)
    }

    /// Current route as `{ path, params, match }`
    #[wasm_bindgen(getter)]
    pub fn route(&self) -> Result<JsValue, JsValue> {
        to_js(&self.navigator.current())
    }

    /// Resolve `path` without navigating
    pub fn resolve(&self, path: &str) -> Result<JsValue, JsValue> {
        to_js(&self.navigator.resolve(path).map_err(to_js_error)?)
    }

    /// Call `callback(route)` after every route transition
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        self.navigator.on_change(move |route| {
            let result = to_js(route).and_then(|value| callback.call1(&JsValue::NULL, &value));
            if let Err(e) = result {
                console::error_2(&JsValue::from_str("waymark: onChange callback threw"), &e);
            }
        });
    }

    /// Whole store state
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.get())
    }

    /// Dispatch an event on the underlying store
    ///
    /// Dispatching `routerNavigate()` behaves like [`navigate`](Self::navigate),
    /// failures included.
    pub fn dispatch(&self, event: &str, payload: JsValue) -> Result<(), JsValue> {
        let payload = js_to_json(&payload)?;
        self.navigator.take_error();
        self.store.dispatch(event, payload);
        match self.navigator.take_error() {
            Some(e) => Err(to_js_error(e)),
            None => Ok(()),
        }
    }

    /// Listen to a store event; `callback(state, payload)` may return a state patch
    pub fn on(&self, event: &str, callback: js_sys::Function) {
        let name = event.to_string();
        self.store.on(
            event,
            event_handler(move |state, payload| {
                let call = || -> Result<Option<serde_json::Value>, JsValue> {
                    let state = to_js(state)?;
                    let payload = to_js(payload)?;
                    let patch = callback.call2(&JsValue::NULL, &state, &payload)?;
                    if patch.is_object() {
                        js_to_json(&patch).map(Some)
                    } else {
                        Ok(None)
                    }
                };
                match call() {
                    Ok(Some(serde_json::Value::Object(patch))) => Some(patch),
                    Ok(_) => None,
                    Err(e) => {
                        let message = format!("waymark: store handler for {} failed", name);
                        console::error_2(&JsValue::from_str(&message), &e);
                        None
                    }
                }
            }),
        );
    }

    /// Remove the DOM listeners; the router stops reacting to clicks and popstate
    pub fn destroy(&mut self) {
        self.detach();
    }
}

impl WaymarkRouter {
    /// Register the document click and window popstate listeners
    fn attach(&mut self) -> Result<(), JsValue> {
        let window = self.history.window().clone();
        let root = window
            .document()
            .and_then(|d| d.document_element())
            .ok_or_else(|| JsValue::from_str("no document element"))?;

        if self.navigator.config().intercept_links {
            let navigator = self.navigator.clone();
            let on_click = Closure::wrap(Box::new(move |event: MouseEvent| {
                let Some(click) = link_click(&event, &navigator.config().ignore_attribute) else {
                    return;
                };
                match navigator.handle_click(&click) {
                    Ok(true) => event.prevent_default(),
                    Ok(false) => {}
                    Err(e) => console::error_1(&JsValue::from_str(&format!(
                        "waymark: following {} natively: {}",
                        click.href, e
                    ))),
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            root.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            self.on_click = Some(on_click);
        }

        let navigator = self.navigator.clone();
        let on_popstate = Closure::wrap(Box::new(move |_: Event| {
            if let Err(e) = navigator.handle_popstate() {
                console::error_1(&JsValue::from_str(&format!("waymark: popstate: {}", e)));
            }
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())?;
        self.on_popstate = Some(on_popstate);

        self.root = Some(root);
        Ok(())
    }

    fn detach(&mut self) {
        if let (Some(root), Some(on_click)) = (self.root.as_ref(), self.on_click.take()) {
            let _ = root
                .remove_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
        }
        if let Some(on_popstate) = self.on_popstate.take() {
            let _ = self.history.window().remove_event_listener_with_callback(
                "popstate",
                on_popstate.as_ref().unchecked_ref(),
            );
        }
        self.root = None;
    }
}

impl Drop for WaymarkRouter {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Collect the facts the interception rules need from a click
///
/// Clicks on elements nested inside an anchor count as clicks on the anchor.
fn link_click(event: &MouseEvent, ignore_attribute: &str) -> Option<LinkClick> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let anchor = target
        .closest("a")
        .ok()
        .flatten()
        .and_then(|a| a.dyn_into::<HtmlAnchorElement>().ok());

    let mut click = LinkClick {
        default_prevented: event.default_prevented(),
        button: event.button(),
        alt_key: event.alt_key(),
        ctrl_key: event.ctrl_key(),
        meta_key: event.meta_key(),
        shift_key: event.shift_key(),
        ..LinkClick::default()
    };

    if let Some(anchor) = anchor {
        click.is_anchor = true;
        click.href = anchor.href();
        click.target = anchor.target();
        click.ignore_marker = anchor.has_attribute(ignore_attribute);
    }

    Some(click)
}
