use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Hold the cursor on a wrong key until it is corrected. The gentler
    /// advance-on-error mode is available for older kids who self-correct.
    #[serde(default = "default_block_on_error")]
    pub block_on_error: bool,
    /// Seconds of silence before the session clock pauses.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Window for collapsing double-fired key events. A heuristic for
    /// terminals that deliver duplicates, not load-bearing logic.
    #[serde(default = "default_key_repeat_window_ms")]
    pub key_repeat_window_ms: u64,
    /// Show the next-key hint line under the practice text.
    #[serde(default = "default_show_key_hint")]
    pub show_key_hint: bool,
}

fn default_block_on_error() -> bool {
    true
}
fn default_idle_timeout_secs() -> u64 {
    5
}
fn default_key_repeat_window_ms() -> u64 {
    50
}
fn default_show_key_hint() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_on_error: default_block_on_error(),
            idle_timeout_secs: default_idle_timeout_secs(),
            key_repeat_window_ms: default_key_repeat_window_ms(),
            show_key_hint: default_show_key_hint(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typekid")
            .join("config.toml")
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn key_repeat_window(&self) -> Duration {
        Duration::from_millis(self.key_repeat_window_ms)
    }
}
