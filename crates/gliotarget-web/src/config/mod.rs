//! Configuration loading for GlioTarget.
//! Reads gliotarget.toml from the current directory or path in GLIOTARGET_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:` for an ephemeral store.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

fn default_db_path() -> PathBuf { PathBuf::from("data.db") }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 3001 }

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_structures")]
    pub structures: Vec<StructureEntry>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { structures: default_structures() }
    }
}

/// A named structure file offered by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub name: String,
    pub path: PathBuf,
}

fn default_structures() -> Vec<StructureEntry> {
    [
        ("EGFR", "egfr.pdb"),
        ("Aptamer-IV", "aptamer_iv.pdb"),
        ("Aptamer-VI", "aptamer_vi.pdb"),
        ("Aptamer-VII", "aptamer_vii.pdb"),
    ]
    .into_iter()
    .map(|(name, path)| StructureEntry { name: name.to_string(), path: PathBuf::from(path) })
    .collect()
}

impl ViewerConfig {
    pub fn find(&self, name: &str) -> Option<&StructureEntry> {
        self.structures.iter().find(|s| s.name == name)
    }
}

mod tests;

impl Config {
    /// Load configuration from gliotarget.toml.
    /// Checks GLIOTARGET_CONFIG env var first, then current directory.
    /// A missing file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("GLIOTARGET_CONFIG")
            .unwrap_or_else(|_| "gliotarget.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::warn!("Config file not found: {}; using defaults", path);
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
