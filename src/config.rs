use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::Level;

use crate::http::connection::ConnectionOptions;

/// Server configuration.
///
/// Built from defaults, then an optional YAML file, then the `LISTEN`
/// environment variable. Command-line flags are applied on top by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    /// 0 = error, 1 = warn, 2 = info, 3 = debug, 4 and up = trace.
    pub log_level: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Ports tried when binding: the configured one, then each next port up.
    pub bind_attempts: u16,
    /// Connections served at once. 1 serves them strictly one after another.
    pub max_connections: usize,
    /// 0 disables the timeout.
    pub read_timeout_secs: u64,
    /// 0 disables the timeout.
    pub write_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            static_files: StaticFilesConfig::default(),
            log_level: 2,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:7341".to_string(),
            bind_attempts: 10,
            max_connections: 64,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Defaults plus the process environment.
    pub fn load() -> Self {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Defaults plus whatever `lookup` returns for the environment keys we read.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().with_env(lookup)
    }

    /// Reads a YAML file, then applies the process environment on top.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg = Self::from_yaml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(cfg.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(listen_addr) = lookup("LISTEN") {
            self.server.listen_addr = listen_addr;
        }
        self
    }

    pub fn max_log_level(&self) -> Level {
        match self.log_level {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            root: self.static_files.root.clone(),
            read_timeout: secs(self.server.read_timeout_secs),
            write_timeout: secs(self.server.write_timeout_secs),
        }
    }
}

fn secs(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}
