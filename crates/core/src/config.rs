use crate::error::{GiffosError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.giphy.com";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub clipboard: ClipboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            clipboard: ClipboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path` if it exists, otherwise falls back to defaults.
    /// A present but unreadable file is an error rather than a silent default.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(GiffosError::Storage(format!(
                    "read {} failed: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            GiffosError::Storage(format!("parse {} failed: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the provider API, without a trailing slash
    pub endpoint: String,
    pub debounce_ms: u64,
    pub page_size: u32,
    /// Giphy response bundle; `low_bandwidth` keeps payloads small
    pub bundle: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            debounce_ms: 500,
            page_size: 10,
            bundle: "low_bandwidth".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClipboardConfig {
    /// How long the "copied" confirmation stays up
    pub confirm_ms: u64,
    pub scratch_file_name: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            confirm_ms: 2000,
            scratch_file_name: "temp_clip.gif".to_string(),
        }
    }
}

impl ClipboardConfig {
    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }
}
