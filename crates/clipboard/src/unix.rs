use crate::ClipboardProvider;
use anyhow::{anyhow, Result};
use clipboard_rs::{Clipboard, ClipboardContext};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Path, PathBuf};

pub struct UnixClipboard;

impl UnixClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixClipboard {
    fn default() -> Self {
        Self::new()
    }
}

// Bytes escaped in a file URI path; `/` stays literal, non-ASCII is always escaped.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// `text/uri-list` entry for an absolute local path.
fn file_uri(path: &Path) -> String {
    format!(
        "file://{}",
        utf8_percent_encode(&path.to_string_lossy(), PATH_SEGMENT)
    )
}

impl ClipboardProvider for UnixClipboard {
    fn set_files(&self, files: Vec<PathBuf>) -> Result<()> {
        let ctx = ClipboardContext::new().map_err(|e| anyhow!("Failed to init clipboard: {}", e))?;
        let uris = files.iter().map(|f| file_uri(f)).collect();
        ctx.set_files(uris)
            .map_err(|e| anyhow!("Failed to set files: {}", e))?;

        log::debug!("Placed {} file(s) on the clipboard", files.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_has_file_scheme() {
        assert_eq!(
            file_uri(Path::new("/home/me/.cache/giffos/temp_clip.gif")),
            "file:///home/me/.cache/giffos/temp_clip.gif"
        );
    }

    #[test]
    fn uri_escapes_spaces_and_non_ascii() {
        assert_eq!(
            file_uri(Path::new("/home/José/My Cache/100%.gif")),
            "file:///home/Jos%C3%A9/My%20Cache/100%25.gif"
        );
    }
}
