//! `window.location` / `window.history` backed environment

use wasm_bindgen::JsValue;
use waymark_core::{Error, History, Result};
use web_sys::Window;

/// The browser's own location and history stack
#[derive(Debug, Clone)]
pub struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    pub fn new() -> std::result::Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        Ok(Self { window })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl History for BrowserHistory {
    fn pathname(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string())
    }

    fn origin(&self) -> String {
        self.window.location().origin().unwrap_or_default()
    }

    fn push(&self, path: &str) -> Result<()> {
        self.window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)))
            .map_err(|e| Error::History(format!("{:?}", e)))
    }
}
