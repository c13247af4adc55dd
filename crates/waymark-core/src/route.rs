//! Route definitions and the published route state

use crate::pattern::{match_path, MatchResult, RoutePattern};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// Handler function receiving captured params in order
///
/// An `Err` carries the reason the payload could not be computed.
pub type HandlerFn = Rc<dyn Fn(&[String]) -> std::result::Result<Value, String>>;

/// What a matched route contributes as its `match` payload
#[derive(Clone)]
pub enum RouteHandler {
    /// Computed from the captured params
    Function(HandlerFn),
    /// Fixed payload
    Static(Value),
}

impl RouteHandler {
    fn payload(&self, params: &[String]) -> std::result::Result<Value, String> {
        match self {
            RouteHandler::Function(f) => f(params),
            // A falsy static payload falls back to `true`
            RouteHandler::Static(value) if is_truthy(value) => Ok(value.clone()),
            RouteHandler::Static(_) => Ok(Value::Bool(true)),
        }
    }
}

impl std::fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteHandler::Function(_) => f.write_str("Function(..)"),
            RouteHandler::Static(value) => f.debug_tuple("Static").field(value).finish(),
        }
    }
}

/// One registered route: a pattern plus an optional handler
#[derive(Debug, Clone)]
pub struct Route {
    pattern: RoutePattern,
    handler: Option<RouteHandler>,
}

impl Route {
    /// Route on a literal template (`/`, `/blog`, `/blog/post/*`)
    pub fn new(template: &str) -> Result<Self> {
        Ok(Self::from_pattern(RoutePattern::literal(template)?))
    }

    /// Route on a regular expression tested against the normalized path
    pub fn regex(expr: &str) -> Result<Self> {
        Ok(Self::from_pattern(RoutePattern::regex(expr)?))
    }

    pub fn from_pattern(pattern: RoutePattern) -> Self {
        Self {
            pattern,
            handler: None,
        }
    }

    /// Compute the payload from captured params
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) -> Value + 'static,
    {
        let f = move |params: &[String]| Ok::<_, String>(f(params));
        self.handler = Some(RouteHandler::Function(Rc::new(f)));
        self
    }

    /// Compute the payload with a handler that may fail
    ///
    /// A failure aborts the transition that triggered resolution.
    pub fn try_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) -> std::result::Result<Value, String> + 'static,
    {
        self.handler = Some(RouteHandler::Function(Rc::new(f)));
        self
    }

    /// Use a fixed payload
    pub fn payload(mut self, value: impl Into<Value>) -> Self {
        self.handler = Some(RouteHandler::Static(value.into()));
        self
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn route_handler(&self) -> Option<&RouteHandler> {
        self.handler.as_ref()
    }
}

/// The record published under the router key
///
/// `match` is `false` when no route claimed the path. A handler that itself
/// returns `false` produces the same record; the two cases are not
/// distinguished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteState {
    /// Last resolved path, as requested
    pub path: String,
    /// Captured params of the matching route
    pub params: Vec<String>,
    /// Handler payload, `true` for routes without a handler, `false` if unmatched
    #[serde(rename = "match")]
    pub matched: Value,
}

impl RouteState {
    /// Build the published record from a match result
    pub fn from_match(result: MatchResult, routes: &[Route]) -> Result<Self> {
        let route = result.pattern_index.and_then(|i| routes.get(i));

        let matched = match route.and_then(|r| r.handler.as_ref()) {
            Some(handler) => handler
                .payload(&result.params)
                .map_err(|reason| Error::Handler {
                    path: result.path.clone(),
                    reason,
                })?,
            None => Value::Bool(route.is_some()),
        };

        Ok(Self {
            path: result.path,
            params: result.params,
            matched,
        })
    }

    /// `false` when the payload is `false`, whichever way it got there
    pub fn is_match(&self) -> bool {
        self.matched != Value::Bool(false)
    }
}

/// Match `path` against `routes` and compute the resulting state
pub fn resolve(path: &str, routes: &[Route]) -> Result<RouteState> {
    let result = match_path(path, routes.iter().map(Route::pattern));
    RouteState::from_match(result, routes)
}

/// JavaScript truthiness for JSON values
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
