use giffos_core::{GifRef, GiffosError, QualityMode};
use serde::Deserialize;
use std::collections::HashMap;

/// Subset of the Giphy search envelope we read. `data` is optional because
/// error replies carry only `meta`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Option<Vec<GiphyGif>>,
}

#[derive(Debug, Deserialize)]
pub struct GiphyGif {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub images: HashMap<String, Rendition>,
}

#[derive(Debug, Deserialize)]
pub struct Rendition {
    pub url: Option<String>,
}

impl SearchResponse {
    /// Picks the rendition for `quality` out of every hit. A hit lacking that
    /// rendition rejects the whole page; mixing renditions is never allowed.
    pub fn into_refs(self, quality: QualityMode) -> Result<Vec<GifRef>, GiffosError> {
        let data = self
            .data
            .ok_or_else(|| GiffosError::MalformedResponse("missing data payload".to_string()))?;

        let rendition = quality.rendition();
        data.into_iter()
            .map(|gif| {
                let url = gif
                    .images
                    .get(rendition)
                    .and_then(|r| r.url.clone())
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        GiffosError::MalformedResponse(format!(
                            "gif {} has no {} rendition",
                            gif.id, rendition
                        ))
                    })?;
                Ok(GifRef {
                    id: gif.id,
                    title: gif.title,
                    url,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> SearchResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn picks_rendition_for_quality() {
        let body = r#"{"data":[{"id":"x1","title":"cat","images":{
            "fixed_width_small":{"url":"https://m/x1/small.gif","width":"100"},
            "downsized":{"url":"https://m/x1/down.gif"}}}]}"#;

        let standard = parse(body).into_refs(QualityMode::Standard).unwrap();
        assert_eq!(standard[0].url, "https://m/x1/small.gif");
        assert_eq!(standard[0].title, "cat");

        let hd = parse(body).into_refs(QualityMode::Hd).unwrap();
        assert_eq!(hd[0].url, "https://m/x1/down.gif");
    }

    #[test]
    fn missing_data_is_malformed() {
        let err = parse(r#"{"meta":{"status":401}}"#)
            .into_refs(QualityMode::Standard)
            .unwrap_err();
        assert!(matches!(err, GiffosError::MalformedResponse(_)));
    }

    #[test]
    fn missing_rendition_rejects_page() {
        let body = r#"{"data":[
            {"id":"a","images":{"fixed_width_small":{"url":"https://m/a.gif"}}},
            {"id":"b","images":{"downsized":{"url":"https://m/b.gif"}}}]}"#;
        let err = parse(body).into_refs(QualityMode::Standard).unwrap_err();
        assert_eq!(
            err,
            GiffosError::MalformedResponse("gif b has no fixed_width_small rendition".to_string())
        );
    }

    #[test]
    fn empty_page_is_fine() {
        let refs = parse(r#"{"data":[]}"#).into_refs(QualityMode::Hd).unwrap();
        assert!(refs.is_empty());
    }
}
