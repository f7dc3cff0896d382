use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cluster::TopologyGenerator;

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: Server,
    pub logging: LoggingConfig,
    pub rest: RestConfig,
    pub cluster: ClusterSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub prefix: String,
}

/// Addressing used when laying out generated topologies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Host part of every generated node address
    pub node_host: String,
    /// Port of the first master; replicas follow the last master
    pub base_port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 15600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/cluster".to_string(),
        }
    }
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            node_host: "127.0.0.1".to_string(),
            base_port: 7000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ServerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Topology generator for the configured node addressing
    pub fn topology_generator(&self) -> TopologyGenerator {
        TopologyGenerator::from_settings(&self.cluster)
    }
}
