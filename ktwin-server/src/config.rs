// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// KTwin Graph Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP listen address (e.g., "127.0.0.1:8080")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphConfig {
    /// JSON array of TwinInstance loaded as the first generation
    #[serde(default)]
    pub inventory_path: Option<PathBuf>,

    /// Path the snapshot is served on
    #[serde(default = "default_route")]
    pub route: String,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_route() -> String {
    "/twin-graph".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            inventory_path: None,
            route: default_route(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - KTWIN_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:8080)
    /// - KTWIN_INVENTORY: Instance inventory file loaded at startup
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("KTWIN_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(path) = std::env::var("KTWIN_INVENTORY") {
            config.graph.inventory_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Load configuration from the file (or defaults), then apply any
    /// environment variables that are explicitly set
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        Ok(Self::merge_with_env(config))
    }

    fn merge_with_env(mut config: Self) -> Self {
        let env_config = Self::from_env();

        if std::env::var("KTWIN_HTTP_ADDR").is_ok() {
            config.server.listen_addr = env_config.server.listen_addr;
        }
        if std::env::var("KTWIN_INVENTORY").is_ok() {
            config.graph.inventory_path = env_config.graph.inventory_path;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {}", self.server.listen_addr))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if !self.graph.route.starts_with('/') {
            anyhow::bail!("Graph route must start with '/': {}", self.graph.route);
        }

        if let Some(path) = &self.graph.inventory_path {
            if !path.is_file() {
                anyhow::bail!("Inventory file not found: {}", path.display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.graph.route, "/twin-graph");
        assert!(config.graph.inventory_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("KTWIN_HTTP_ADDR", "0.0.0.0:9090");

        let config = ServerConfig::from_env();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9090");

        std::env::remove_var("KTWIN_HTTP_ADDR");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten_addr = \"0.0.0.0:8181\"\n\n[graph]\nroute = \"/graph\"").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8181");
        assert_eq!(config.graph.route, "/graph");
        assert!(config.server.enable_cors);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.server.listen_addr = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.graph.route = "twin-graph".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.graph.inventory_path = Some(PathBuf::from("/nonexistent/instances.json"));
        assert!(config.validate().is_err());
    }
}
