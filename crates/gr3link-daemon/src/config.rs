//! Configuration loading

use anyhow::Result;
use gr3link_device::{DeviceConfig, CONNECT_TIMEOUT_MS, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSection {
    /// Camera API base URL, including the `/v1` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Endpoint probed on connect, relative to `base_url`
    #[serde(default = "default_status_path")]
    pub status_path: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_listing_timeout")]
    pub listing_timeout_secs: u64,
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: String,
    /// Always use demo mode, never probe the camera
    #[serde(default)]
    pub mock: bool,
    #[serde(default = "default_mock_latency")]
    pub mock_latency_ms: u64,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            status_path: default_status_path(),
            connect_timeout_ms: default_connect_timeout(),
            listing_timeout_secs: default_listing_timeout(),
            thumbnail_size: default_thumbnail_size(),
            mock: false,
            mock_latency_ms: default_mock_latency(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_status_path() -> String {
    "photos".to_string()
}

fn default_connect_timeout() -> u64 {
    CONNECT_TIMEOUT_MS
}

fn default_listing_timeout() -> u64 {
    10
}

fn default_thumbnail_size() -> String {
    "thumb".to_string()
}

fn default_mock_latency() -> u64 {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the recipe store files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./gr3link-data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Web UI files served at the root (optional)
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Convert to the device client's runtime configuration
    pub fn to_device_config(&self) -> DeviceConfig {
        DeviceConfig {
            base_url: self.device.base_url.clone(),
            status_path: self.device.status_path.clone(),
            connect_timeout: Duration::from_millis(self.device.connect_timeout_ms),
            listing_timeout: Duration::from_secs(self.device.listing_timeout_secs),
            thumbnail_size: self.device.thumbnail_size.clone(),
            force_mock: self.device.mock,
            mock_latency: Duration::from_millis(self.device.mock_latency_ms),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.device.base_url, "http://192.168.0.1/v1");
        assert_eq!(config.device.connect_timeout_ms, 3000);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gr3link.toml");
        std::fs::write(&path, "[device]\nmock = true\n\n[storage]\ndata_dir = \"/tmp/recipes\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.device.mock);
        assert_eq!(config.device.status_path, "photos");
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/recipes"));

        let device = config.to_device_config();
        assert!(device.force_mock);
        assert_eq!(device.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_default_config_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gr3link.toml");
        save_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.device.thumbnail_size, "thumb");
        assert_eq!(config.storage.data_dir, default_data_dir());
    }
}
