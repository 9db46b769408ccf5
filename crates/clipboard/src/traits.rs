use anyhow::Result;
use std::path::PathBuf;

pub trait ClipboardProvider: Send + Sync {
    /// Replace the clipboard contents with a file list, as if the files had
    /// been copied in the platform file manager.
    fn set_files(&self, files: Vec<PathBuf>) -> Result<()>;
}
