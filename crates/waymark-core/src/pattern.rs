//! Path normalization and route pattern matching
//!
//! Paths are compared after stripping one leading and one trailing `/`:
//! ```text
//! /blog/post/hello  ->  blog/post/hello
//! /blog/            ->  blog
//! /                 ->  (empty)
//! ```
//!
//! Pattern keys come in two shapes:
//! - literal templates, where `*` matches one segment's worth of non-slash
//!   characters (case-insensitive)
//! - regular expressions, tested against the normalized path as written
//! - custom matchers implementing [`PathMatcher`], for engines other than
//!   `regex-lite` (the browser binding matches JS `RegExp` keys this way)

use crate::{Error, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::trace;

/// Capture group substituted for each `*` in a literal template
const WILDCARD_GROUP: &str = "([^/]*)";

/// Strip exactly one leading and one trailing `/`
pub fn normalize(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// A matching engine plugged in behind [`RoutePattern::Custom`]
pub trait PathMatcher: std::fmt::Debug {
    /// Test an already-normalized path, returning captured params on success
    fn captures(&self, normalized: &str) -> Option<Vec<String>>;

    /// Number of capture groups the expression declares
    fn capture_count(&self) -> usize;

    /// Source text of the key
    fn as_str(&self) -> &str;
}

/// A compiled route pattern key
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Literal template, optionally containing `*` wildcards
    Literal {
        template: String,
        wildcard: Option<Regex>,
    },
    /// Caller-supplied regular expression
    Regex { expr: Regex },
    /// Externally implemented matcher
    Custom(Rc<dyn PathMatcher>),
}

impl RoutePattern {
    /// Compile a literal template such as `/blog/post/*`
    pub fn literal(template: &str) -> Result<Self> {
        let normalized = normalize(template);

        let wildcard = if normalized.contains('*') {
            let body = normalized
                .split('*')
                .map(regex_lite::escape)
                .collect::<Vec<_>>()
                .join(WILDCARD_GROUP);
            let source = format!("(?i)^{}$", body);
            Some(Regex::new(&source).map_err(|e| Error::InvalidPattern {
                pattern: template.to_string(),
                reason: e.to_string(),
            })?)
        } else {
            None
        };

        Ok(RoutePattern::Literal {
            template: template.to_string(),
            wildcard,
        })
    }

    /// Compile a regular expression key such as `^blog/post/(\d+)$`
    pub fn regex(expr: &str) -> Result<Self> {
        let expr = Regex::new(expr).map_err(|e| Error::InvalidPattern {
            pattern: expr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(RoutePattern::Regex { expr })
    }

    pub fn custom(matcher: impl PathMatcher + 'static) -> Self {
        RoutePattern::Custom(Rc::new(matcher))
    }

    /// Number of capture groups the pattern declares
    ///
    /// This is the length of `params` for every match except one: a wildcard
    /// template whose normalized text equals the path (`/blog/*` requested as
    /// `/blog/*`) matches by exact equality and yields no params at all.
    pub fn capture_count(&self) -> usize {
        match self {
            RoutePattern::Literal {
                wildcard: Some(re), ..
            } => re.captures_len() - 1,
            RoutePattern::Literal { wildcard: None, .. } => 0,
            RoutePattern::Regex { expr } => expr.captures_len() - 1,
            RoutePattern::Custom(matcher) => matcher.capture_count(),
        }
    }

    /// Test an already-normalized path, returning captured params on success
    pub fn captures(&self, normalized: &str) -> Option<Vec<String>> {
        match self {
            RoutePattern::Literal { template, wildcard } => {
                // Exact equality wins even when the template holds a `*`
                if normalize(template) == normalized {
                    return Some(Vec::new());
                }
                wildcard
                    .as_ref()
                    .and_then(|re| collect_groups(re, normalized))
            }
            RoutePattern::Regex { expr } => collect_groups(expr, normalized),
            RoutePattern::Custom(matcher) => matcher.captures(normalized),
        }
    }

    /// Key as written by the caller
    pub fn as_str(&self) -> &str {
        match self {
            RoutePattern::Literal { template, .. } => template,
            RoutePattern::Regex { expr } => expr.as_str(),
            RoutePattern::Custom(matcher) => matcher.as_str(),
        }
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutePattern::Literal { template, .. } => write!(f, "{}", template),
            RoutePattern::Regex { expr } => write!(f, "/{}/", expr.as_str()),
            RoutePattern::Custom(matcher) => write!(f, "{}", matcher.as_str()),
        }
    }
}

impl TryFrom<&str> for RoutePattern {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        RoutePattern::literal(s)
    }
}

/// Groups that did not participate in the match become empty strings
fn collect_groups(re: &Regex, haystack: &str) -> Option<Vec<String>> {
    let caps = re.captures(haystack)?;
    Some(
        caps.iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect(),
    )
}

/// Outcome of matching one path against an ordered pattern list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Raw path as requested, not normalized
    pub path: String,
    /// Index of the first pattern that matched; `None` means not found
    pub pattern_index: Option<usize>,
    /// Captured values in group order
    pub params: Vec<String>,
}

impl MatchResult {
    fn not_found(path: &str) -> Self {
        Self {
            path: path.to_string(),
            pattern_index: None,
            params: Vec::new(),
        }
    }

    /// Check whether any pattern claimed the path
    pub fn is_match(&self) -> bool {
        self.pattern_index.is_some()
    }
}

/// Match `path` against `patterns` in declaration order; first match wins
pub fn match_path<'a, I>(path: &str, patterns: I) -> MatchResult
where
    I: IntoIterator<Item = &'a RoutePattern>,
{
    let normalized = normalize(path);

    for (index, pattern) in patterns.into_iter().enumerate() {
        if let Some(params) = pattern.captures(normalized) {
            trace!("{} matched {} (#{})", path, pattern, index);
            return MatchResult {
                path: path.to_string(),
                pattern_index: Some(index),
                params,
            };
        }
    }

    trace!("{} matched no pattern", path);
    MatchResult::not_found(path)
}
