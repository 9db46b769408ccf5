use crate::model::SearchResponse;
use crate::traits::GifProvider;
use async_trait::async_trait;
use bytes::Bytes;
use giffos_core::{GifRef, GiffosError, SearchConfig, SearchRequest};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct GiphyClient {
    http: reqwest::Client,
    endpoint: String,
    bundle: String,
}

impl GiphyClient {
    pub fn new(endpoint: impl Into<String>, bundle: impl Into<String>) -> Result<Self, GiffosError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GiffosError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bundle: bundle.into(),
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, GiffosError> {
        Self::new(config.endpoint.clone(), config.bundle.clone())
    }
}

#[async_trait]
impl GifProvider for GiphyClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<GifRef>, GiffosError> {
        let url = format!("{}/v1/gifs/search", self.endpoint);
        let limit = request.limit.to_string();
        let offset = request.offset.to_string();
        tracing::debug!(
            "Searching {:?} (offset {}, {:?})",
            request.query,
            request.offset,
            request.quality
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", request.api_key.as_str()),
                ("q", request.query.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("bundle", self.bundle.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GiffosError::Network(format!("search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GiffosError::Network(format!("search returned {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GiffosError::Network(format!("search body read failed: {}", e)))?;
        let parsed: SearchResponse = serde_json::from_slice(&body)
            .map_err(|e| GiffosError::MalformedResponse(e.to_string()))?;

        let gifs = parsed.into_refs(request.quality)?;
        tracing::info!("Search {:?} returned {} gifs", request.query, gifs.len());
        Ok(gifs)
    }

    async fn fetch_asset(&self, url: &str) -> Result<Bytes, GiffosError> {
        tracing::debug!("Fetching asset {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GiffosError::Network(format!("asset request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GiffosError::Network(format!("asset fetch returned {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GiffosError::Network(format!("asset body read failed: {}", e)))?;
        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giffos_core::QualityMode;
    use mockito::{Matcher, Server};

    fn request(query: &str, offset: u32, quality: QualityMode) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            offset,
            limit: 10,
            quality,
            api_key: "test-key".to_string(),
        }
    }

    #[tokio::test]
    async fn search_sends_query_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/gifs/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
                Matcher::UrlEncoded("q".into(), "funny cat".into()),
                Matcher::UrlEncoded("limit".into(), "10".into()),
                Matcher::UrlEncoded("offset".into(), "20".into()),
                Matcher::UrlEncoded("bundle".into(), "low_bandwidth".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[{"id":"g1","title":"t","images":{"downsized":{"url":"https://m/g1.gif"}}}]}"#,
            )
            .create_async()
            .await;

        let client = GiphyClient::new(server.url(), "low_bandwidth").unwrap();
        let gifs = client
            .search(&request("funny cat", 20, QualityMode::Hd))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(gifs.len(), 1);
        assert_eq!(gifs[0].url, "https://m/g1.gif");
    }

    #[tokio::test]
    async fn search_error_status_is_network_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/search")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"meta":{"status":401,"msg":"Unauthorized"}}"#)
            .create_async()
            .await;

        let client = GiphyClient::new(server.url(), "low_bandwidth").unwrap();
        let err = client
            .search(&request("cat", 0, QualityMode::Standard))
            .await
            .unwrap_err();
        assert!(matches!(err, GiffosError::Network(_)));
    }

    #[tokio::test]
    async fn search_non_json_body_is_malformed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = GiphyClient::new(server.url(), "low_bandwidth").unwrap();
        let err = client
            .search(&request("cat", 0, QualityMode::Standard))
            .await
            .unwrap_err();
        assert!(matches!(err, GiffosError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn fetch_asset_returns_body_bytes() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/g1.gif")
            .with_status(200)
            .with_body(b"GIF89a-bytes".to_vec())
            .create_async()
            .await;

        let client = GiphyClient::new(server.url(), "low_bandwidth").unwrap();
        let bytes = client
            .fetch_asset(&format!("{}/media/g1.gif", server.url()))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"GIF89a-bytes");
    }

    #[tokio::test]
    async fn fetch_asset_missing_is_network_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/gone.gif")
            .with_status(404)
            .create_async()
            .await;

        let client = GiphyClient::new(server.url(), "low_bandwidth").unwrap();
        let err = client
            .fetch_asset(&format!("{}/media/gone.gif", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, GiffosError::Network(_)));
    }
}
