//! Grouping of windows that belong to one logical application instance.
//!
//! Editors like VS Code or Obsidian open several top-level windows for the
//! same workspace; shoving one of them to another desktop should take the
//! whole set along. A rule extracts an instance key from the focused
//! window's title; other windows of the same process whose titles contain
//! that key belong to the group.

use regex::Regex;
use tracing::warn;

use crate::common::collections::HashSet;
use crate::common::config::RelatedWindowRule;
use crate::sys::desktop::{WindowId, WindowInfo};

pub struct WindowMatcher {
    rules: Vec<Regex>,
}

impl WindowMatcher {
    /// Compiles the configured rules, dropping invalid ones with a warning.
    /// A rule must have at least one capture group; group 1 is the key.
    pub fn new(rules: &[RelatedWindowRule]) -> WindowMatcher {
        let rules = rules
            .iter()
            .filter_map(|rule| match Regex::new(&rule.title_key) {
                Ok(re) if re.captures_len() >= 2 => Some(re),
                Ok(_) => {
                    warn!("related-window rule {:?} has no capture group, ignoring", rule.title_key);
                    None
                }
                Err(e) => {
                    warn!("invalid related-window rule {:?}: {e}", rule.title_key);
                    None
                }
            })
            .collect();
        WindowMatcher { rules }
    }

    /// The focused window plus every same-process window of the same
    /// instance. The focused window is always first; without a matching
    /// rule the group is just the focused window.
    pub fn related(&self, focused: &WindowInfo, candidates: &[WindowInfo]) -> Vec<WindowInfo> {
        let mut group = vec![focused.clone()];
        let Some(key) = self.instance_key(&focused.title) else {
            return group;
        };
        let mut seen: HashSet<WindowId> = HashSet::default();
        seen.insert(focused.id);
        for window in candidates {
            if window.pid == focused.pid && window.title.contains(key) && seen.insert(window.id) {
                group.push(window.clone());
            }
        }
        group
    }

    fn instance_key<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.rules
            .iter()
            .find_map(|re| re.captures(title).and_then(|c| c.get(1)).map(|m| m.as_str()))
            .filter(|key| !key.is_empty())
    }
}
