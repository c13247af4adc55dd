//! `RegExp` route keys, matched by the browser's own engine
//!
//! Keys keep their full JS syntax (lookaround, backreferences, named groups)
//! and every flag. Matching runs `exec` from index 0, so `g` and `y` never
//! carry state between paths and `y` anchors at the start.

use js_sys::RegExp;
use waymark_core::PathMatcher;

#[derive(Debug)]
pub struct JsRegExp {
    re: RegExp,
    source: String,
    groups: usize,
}

impl JsRegExp {
    pub fn new(re: &RegExp) -> Self {
        let source: String = re.source().into();
        let flags: String = re.flags().into();
        Self {
            re: re.clone(),
            groups: count_groups(&source, &flags),
            source,
        }
    }
}

impl PathMatcher for JsRegExp {
    fn captures(&self, normalized: &str) -> Option<Vec<String>> {
        self.re.set_last_index(0);
        let found = self.re.exec(normalized)?;
        Some(
            found
                .iter()
                .skip(1)
                .map(|group| group.as_string().unwrap_or_default())
                .collect(),
        )
    }

    fn capture_count(&self) -> usize {
        self.groups
    }

    fn as_str(&self) -> &str {
        &self.source
    }
}

/// `(?:source)|` always matches the empty string, reporting every group
fn count_groups(source: &str, flags: &str) -> usize {
    let flags: String = flags.chars().filter(|f| !matches!(f, 'g' | 'y')).collect();
    let counter = RegExp::new(&format!("(?:{})|", source), &flags);
    counter
        .exec("")
        .map(|found| (found.length() as usize).saturating_sub(1))
        .unwrap_or(0)
}
