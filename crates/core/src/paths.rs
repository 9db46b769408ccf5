use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "giffos";
pub const STORE_FILE_NAME: &str = "config.json";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Directories the app owns. Resolved once at startup and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl AppPaths {
    /// Platform directories from `dirs`, e.g. `~/.config/giffos` and `~/.cache/giffos`.
    pub fn from_system() -> Option<Self> {
        Some(Self {
            config_dir: dirs::config_dir()?.join(APP_DIR_NAME),
            cache_dir: dirs::cache_dir()?.join(APP_DIR_NAME),
        })
    }

    pub fn store_file(&self) -> PathBuf {
        self.config_dir.join(STORE_FILE_NAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }

    pub fn scratch_file(&self, name: &str) -> PathBuf {
        self.cache_dir.join(name)
    }
}
