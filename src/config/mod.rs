mod defaults;
mod endpoint;

pub use defaults::*;
pub use endpoint::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Connection settings for the secrets service.
///
/// The plain `protocol`/`port`/`host` keys describe the surrounding
/// platform configuration; the `papi_*` keys override them for the
/// secrets API specifically. See [`base_uri`] for the resolution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub host: Option<String>,
    pub papi_protocol: Option<String>,
    pub papi_port: Option<u16>,
    pub papi_host: Option<String>,
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                info!("Loading config from {}", path.display());
                load_config_file(path)?
            }
            _ => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };

        // Apply environment variable overrides
        config.apply_env_overrides();

        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &str) -> Result<()> {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(protocol) = std::env::var("PANTHEON_PROTOCOL") {
            self.protocol = protocol;
        }

        if let Ok(port) = std::env::var("PANTHEON_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }

        if let Ok(host) = std::env::var("PANTHEON_HOST") {
            self.host = Some(host);
        }

        if let Ok(protocol) = std::env::var("PANTHEON_PAPI_PROTOCOL") {
            self.papi_protocol = Some(protocol);
        }

        if let Ok(port) = std::env::var("PANTHEON_PAPI_PORT") {
            if let Ok(port) = port.parse() {
                self.papi_port = Some(port);
            }
        }

        if let Ok(host) = std::env::var("PANTHEON_PAPI_HOST") {
            self.papi_host = Some(host);
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            port: default_port(),
            host: None,
            papi_protocol: None,
            papi_port: None,
            papi_host: None,
        }
    }
}

/// Locate a config file when the front end did not name one.
///
/// An embedding CLI normally hands an explicit path to [`Config::load`];
/// the fallbacks here are the `PANTHEON_CONFIG` variable and the user
/// config directory (`$XDG_CONFIG_HOME` or the platform equivalent).
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("PANTHEON_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let dir = dirs::config_dir()?.join("pantheon");
    ["secrets.json", "secrets.json5", "secrets.yaml", "secrets.toml"]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Load configuration from a file path.
fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => {
            // Try JSON5 first, then regular JSON
            json5::from_str(&content).or_else(|_| {
                serde_json::from_str(&content).map_err(|e| json5::Error::Message {
                    msg: e.to_string(),
                    location: None,
                })
            })?
        }
    };

    Ok(config)
}
