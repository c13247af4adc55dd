//! In-page link interception

/// Primary (usually left) mouse button
pub const PRIMARY_BUTTON: i16 = 0;

/// Anchor `target` value that opens a new tab or window
pub const BLANK_TARGET: &str = "_blank";

/// Facts about a click, gathered by the environment from the DOM event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    /// Default action was already suppressed by someone else
    pub default_prevented: bool,
    /// Click target is an `<a>` element
    pub is_anchor: bool,
    /// Fully resolved `href` of the anchor
    pub href: String,
    /// The anchor's `target` attribute
    pub target: String,
    /// The anchor carries the opt-out attribute
    pub ignore_marker: bool,
    /// `MouseEvent.button`
    pub button: i16,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
}

impl LinkClick {
    /// Plain primary-button click on an anchor pointing at `href`
    pub fn anchor(href: &str) -> Self {
        Self {
            is_anchor: true,
            href: href.to_string(),
            ..Self::default()
        }
    }

    fn has_modifier(&self) -> bool {
        self.alt_key || self.ctrl_key || self.meta_key || self.shift_key
    }
}

/// Decide whether `click` should become an internal navigation
///
/// Returns the href with `origin` stripped (query and fragment kept) when
/// every condition holds, `None` when the browser should handle the click.
pub fn should_intercept(click: &LinkClick, origin: &str) -> Option<String> {
    if click.default_prevented
        || !click.is_anchor
        || click.target == BLANK_TARGET
        || click.ignore_marker
        || click.button != PRIMARY_BUTTON
        || click.has_modifier()
    {
        return None;
    }

    let rest = click.href.strip_prefix(origin)?;
    // `https://example.com.evil` shares the prefix but not the origin
    match rest.chars().next() {
        None => Some("/".to_string()),
        Some('/') => Some(rest.to_string()),
        Some('?') | Some('#') => Some(format!("/{}", rest)),
        Some(_) => None,
    }
}
