use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::engine::RetryPolicy;

pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap().join(".config").join("pandesk").join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Maximum number of desktop visits kept for undo/redo.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// How often the background sampler records the visible desktop.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// What to do when the native desktop manager goes stale.
    #[serde(default = "default_recovery")]
    pub recovery: RetryPolicy,
    /// Rules that group windows belonging to one logical app instance, so
    /// shove and drag take all of them along.
    #[serde(default)]
    pub related_windows: Vec<RelatedWindowRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
            recovery: default_recovery(),
            related_windows: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RelatedWindowRule {
    /// Regex run against the focused window's title; capture group 1 is
    /// the key shared by every window of the same instance.
    pub title_key: String,
}

fn default_history_capacity() -> usize {
    1024
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_recovery() -> RetryPolicy {
    RetryPolicy::ReinitOnce
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config =
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Human-readable issues that should block startup.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.settings.history_capacity == 0 {
            issues.push("settings.history_capacity must be at least 1".to_string());
        }
        if self.settings.poll_interval_ms == 0 {
            issues.push("settings.poll_interval_ms must be at least 1".to_string());
        }
        if let RetryPolicy::Backoff { attempts: 0, .. } = self.settings.recovery {
            issues.push("settings.recovery backoff needs at least 1 attempt".to_string());
        }
        for rule in &self.settings.related_windows {
            match Regex::new(&rule.title_key) {
                Ok(re) if re.captures_len() < 2 => issues.push(format!(
                    "related-window rule {:?} needs a capture group for the instance key",
                    rule.title_key
                )),
                Ok(_) => {}
                Err(e) => issues.push(format!(
                    "related-window rule {:?} is not a valid regex: {e}",
                    rule.title_key
                )),
            }
        }
        issues
    }
}
