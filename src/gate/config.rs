//! Gateway listener configuration (`[server]` table)

use serde::{Deserialize, Serialize};

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host address to listen on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl GatewayConfig {
    /// Read the `[server]` table from a config file, falling back to defaults
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        struct File {
            #[serde(default)]
            server: GatewayConfig,
        }

        let file: File = toml::from_str(content)?;
        Ok(file.server)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
