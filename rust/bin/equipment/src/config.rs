//! Client-side context management.
//!
//! Reads/writes `~/.equipment/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use equipment_client::DEFAULT_BASE_URL;
use equipment_panel::PanelConfig;
use serde::{Deserialize, Serialize};

/// A single context: one equipment API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Context name (e.g. "plant-a").
    pub name: String,

    /// Server URL (e.g. "http://localhost:8080").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Context {
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            timeout_secs: None,
        }
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Panel behavior shared by all contexts.
    #[serde(default)]
    pub panel: PanelConfig,
}

/// Where commands connect to, after overrides are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub server: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Default config file path: ~/.equipment/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or replace a context by name.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context.clear();
        }
        self.contexts.len() < len
    }

    /// Resolve the server to talk to.
    ///
    /// `--server` wins, then the current context, then the default URL.
    pub fn target(&self, server_override: Option<&str>) -> Target {
        let ctx = self.current();
        let server = server_override
            .map(str::to_string)
            .or_else(|| ctx.map(|c| c.server.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = ctx.and_then(|c| c.timeout_secs).map(Duration::from_secs);
        Target { server, timeout }
    }
}

/// Return the equipment config directory (~/.equipment).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".equipment")
}
