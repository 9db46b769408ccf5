//! Provider API key persistence.
//!
//! The key lives in a small key-value store under a single entry. It is read
//! once at startup and written back on every change; there is no expiry.

use crate::error::{GiffosError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

pub const API_KEY_ENTRY: &str = "apiKey";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-value store backed by one JSON object file. Entries other than the
/// ones we write are preserved.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(GiffosError::Storage(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(GiffosError::Storage(format!(
                "parse {} failed: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.read_map().await?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_owned))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let body = serde_json::to_vec_pretty(&Value::Object(map))
            .map_err(|e| GiffosError::Storage(e.to_string()))?;

        // Readers never see a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// The in-memory API key plus the store it is mirrored to.
pub struct Credential {
    store: Arc<dyn CredentialStore>,
    value: String,
}

impl Credential {
    /// Loads the key once. A store that cannot be read yields an empty key,
    /// the user can still type one in.
    pub async fn load(store: Arc<dyn CredentialStore>) -> Self {
        let value = match store.get(API_KEY_ENTRY).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Failed to load API key: {}", e);
                String::new()
            }
        };
        Self { store, value }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the key and persists it. The in-memory value is updated even
    /// when persisting fails. Returns `Ok(false)` if the key did not change.
    pub async fn update(&mut self, value: String) -> Result<bool> {
        if value == self.value {
            return Ok(false);
        }
        self.value = value;
        self.store.set(API_KEY_ENTRY, &self.value).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_store_reads_as_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("config.json")));
        let credential = Credential::load(store).await;
        assert_eq!(credential.value(), "");
    }

    #[tokio::test]
    async fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let store = Arc::new(JsonFileStore::new(&path));
        let mut credential = Credential::load(store).await;
        assert!(credential.update("abc123".to_string()).await.unwrap());
        assert!(!credential.update("abc123".to_string()).await.unwrap());

        let reloaded = Credential::load(Arc::new(JsonFileStore::new(&path))).await;
        assert_eq!(reloaded.value(), "abc123");
    }

    #[tokio::test]
    async fn set_keeps_unrelated_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"theme":"dark"}"#).await.unwrap();

        let store = JsonFileStore::new(&path);
        store.set(API_KEY_ENTRY, "k").await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value[API_KEY_ENTRY], "k");
    }

    #[tokio::test]
    async fn corrupt_store_falls_back_to_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "[1, 2]").await.unwrap();

        let store = Arc::new(JsonFileStore::new(&path));
        assert!(matches!(
            store.get(API_KEY_ENTRY).await,
            Err(GiffosError::Storage(_))
        ));
        assert_eq!(Credential::load(store).await.value(), "");
    }
}
