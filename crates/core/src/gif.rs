use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityMode {
    #[default]
    Standard,
    Hd,
}

impl QualityMode {
    /// Name of the Giphy rendition fetched for this mode.
    pub fn rendition(self) -> &'static str {
        match self {
            QualityMode::Standard => "fixed_width_small",
            QualityMode::Hd => "downsized",
        }
    }

    pub fn from_hd(hd: bool) -> Self {
        if hd {
            QualityMode::Hd
        } else {
            QualityMode::Standard
        }
    }
}

/// One search hit. `url` points at the rendition matching the quality mode
/// the result was fetched under.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GifRef {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub offset: u32,
    pub limit: u32,
    pub quality: QualityMode,
    pub api_key: String,
}
