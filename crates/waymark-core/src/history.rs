//! Navigation environment capability
//!
//! The router reads the current location and pushes new entries through
//! [`History`]. Back/forward traversal belongs to the environment, which
//! reports it by calling `Navigator::handle_popstate`.

use crate::Result;
use std::cell::RefCell;

/// Location and history stack of the hosting environment
pub trait History {
    /// Path portion of the current location (`/blog/post/1`)
    fn pathname(&self) -> String;

    /// Origin of the current location (`https://example.com`)
    fn origin(&self) -> String;

    /// Push a new entry for `path` without reloading
    fn push(&self, path: &str) -> Result<()>;
}

/// In-memory history stack for tests and non-browser hosts
#[derive(Debug)]
pub struct MemoryHistory {
    origin: String,
    inner: RefCell<Stack>,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    /// Start at `initial` on origin `http://localhost`
    pub fn new(initial: &str) -> Self {
        Self::with_origin("http://localhost", initial)
    }

    pub fn with_origin(origin: &str, initial: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            inner: RefCell::new(Stack {
                entries: vec![initial.to_string()],
                index: 0,
            }),
        }
    }

    /// Step back one entry; returns the new path, `None` at the start
    pub fn back(&self) -> Option<String> {
        self.go(-1)
    }

    /// Step forward one entry; returns the new path, `None` at the end
    pub fn forward(&self) -> Option<String> {
        self.go(1)
    }

    /// Move `delta` entries; out-of-range moves leave the stack untouched
    pub fn go(&self, delta: isize) -> Option<String> {
        let mut stack = self.inner.borrow_mut();
        let target = stack.index.checked_add_signed(delta)?;
        let path = stack.entries.get(target)?.clone();
        stack.index = target;
        Some(path)
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.inner.borrow().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl History for MemoryHistory {
    fn pathname(&self) -> String {
        let stack = self.inner.borrow();
        stack.entries[stack.index].clone()
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn push(&self, path: &str) -> Result<()> {
        let mut stack = self.inner.borrow_mut();
        let next = stack.index + 1;
        stack.entries.truncate(next);
        stack.entries.push(path.to_string());
        stack.index = next;
        Ok(())
    }
}
