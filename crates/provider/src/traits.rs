use async_trait::async_trait;
use bytes::Bytes;
use giffos_core::{GifRef, GiffosError, SearchRequest};

#[async_trait]
pub trait GifProvider: Send + Sync {
    /// One page of hits for `request`, in provider rank order.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<GifRef>, GiffosError>;

    /// Raw bytes of a GIF asset.
    async fn fetch_asset(&self, url: &str) -> Result<Bytes, GiffosError>;
}
