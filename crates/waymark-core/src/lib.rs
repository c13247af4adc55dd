//! Waymark Core
//!
//! Client-side URL routing for event-driven state stores.
//!
//! This crate provides:
//! - Path normalization and pattern matching ([`RoutePattern`], [`match_path`])
//! - Route definitions and the published route record ([`Route`], [`RouteState`])
//! - The state container capability and an in-process store ([`Store`], [`EventStore`])
//! - The history capability and an in-memory stack ([`History`], [`MemoryHistory`])
//! - Link click interception ([`LinkClick`], [`should_intercept`])
//! - The navigation synchronizer ([`create_router`], [`Navigator`])

pub mod error;
pub mod history;
pub mod link;
pub mod navigator;
pub mod pattern;
pub mod route;
pub mod store;

pub use error::{Error, Result};
pub use history::{History, MemoryHistory};
pub use link::{should_intercept, LinkClick};
pub use navigator::{
    create_router, Navigator, RouterConfig, RouterModule, ROUTER_CHANGE, ROUTER_CHANGED,
    ROUTER_KEY, ROUTER_NAVIGATE,
};
pub use pattern::{match_path, normalize, MatchResult, PathMatcher, RoutePattern};
pub use route::{resolve, Route, RouteHandler, RouteState};
pub use store::{event_handler, EventHandler, EventStore, State, Store, CHANGED, INIT};
