use crate::events::CopyPhase;
use giffos_clipboard::ClipboardProvider;
use giffos_core::{GifRef, GiffosError};
use giffos_provider::GifProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One copy action: which GIF, and where its bytes are staged.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingRequest {
    pub source: GifRef,
    pub scratch_path: PathBuf,
}

/// Downloads a GIF into the single scratch slot and puts that file on the
/// clipboard. The slot is overwritten by every copy.
pub struct StagingPipeline {
    provider: Arc<dyn GifProvider>,
    clipboard: Arc<dyn ClipboardProvider>,
}

impl StagingPipeline {
    pub fn new(provider: Arc<dyn GifProvider>, clipboard: Arc<dyn ClipboardProvider>) -> Self {
        Self {
            provider,
            clipboard,
        }
    }

    /// Runs fetch, stage and hand-off in order, reporting each phase as it
    /// starts. Stops at the first failing step; the scratch file is only
    /// touched once the download has fully arrived.
    pub async fn run<F>(&self, request: StagingRequest, mut on_phase: F) -> Result<PathBuf, GiffosError>
    where
        F: FnMut(CopyPhase),
    {
        on_phase(CopyPhase::Fetching);
        let bytes = self.provider.fetch_asset(&request.source.url).await?;
        if bytes.is_empty() {
            return Err(GiffosError::MalformedResponse(format!(
                "empty asset body for {}",
                request.source.url
            )));
        }

        on_phase(CopyPhase::Staging);
        write_scratch(&request.scratch_path, &bytes).await?;

        on_phase(CopyPhase::Handoff);
        let clipboard = self.clipboard.clone();
        let path = request.scratch_path.clone();
        tokio::task::spawn_blocking(move || clipboard.set_files(vec![path]))
            .await
            .map_err(|e| GiffosError::NativeHandoff(format!("clipboard task panicked: {}", e)))?
            .map_err(|e| GiffosError::NativeHandoff(e.to_string()))?;

        Ok(request.scratch_path)
    }
}

async fn write_scratch(path: &Path, bytes: &[u8]) -> Result<(), GiffosError> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            GiffosError::Storage(format!("create {} failed: {}", dir.display(), e))
        })?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| GiffosError::Storage(format!("write {} failed: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use giffos_core::SearchRequest;
    use std::sync::Mutex;

    struct AssetOnly {
        body: Option<&'static [u8]>,
    }

    #[async_trait]
    impl GifProvider for AssetOnly {
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<GifRef>, GiffosError> {
            Ok(Vec::new())
        }

        async fn fetch_asset(&self, url: &str) -> Result<Bytes, GiffosError> {
            self.body
                .map(Bytes::from_static)
                .ok_or_else(|| GiffosError::Network(format!("unreachable: {url}")))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        fail: bool,
        copied: Mutex<Vec<PathBuf>>,
    }

    impl ClipboardProvider for RecordingClipboard {
        fn set_files(&self, files: Vec<PathBuf>) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("clipboard busy");
            }
            self.copied.lock().unwrap().extend(files);
            Ok(())
        }
    }

    fn request(dir: &Path) -> StagingRequest {
        StagingRequest {
            source: GifRef {
                id: "g1".into(),
                title: "cat".into(),
                url: "https://m/g1.gif".into(),
            },
            scratch_path: dir.join("cache").join("temp_clip.gif"),
        }
    }

    #[tokio::test]
    async fn stages_file_and_hands_it_off() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = Arc::new(RecordingClipboard::default());
        let pipeline = StagingPipeline::new(
            Arc::new(AssetOnly { body: Some(b"GIF89a") }),
            clipboard.clone(),
        );

        let mut phases = Vec::new();
        let req = request(dir.path());
        let path = pipeline.run(req.clone(), |p| phases.push(p)).await.unwrap();

        assert_eq!(path, req.scratch_path);
        assert_eq!(
            phases,
            [CopyPhase::Fetching, CopyPhase::Staging, CopyPhase::Handoff]
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");
        assert_eq!(*clipboard.copied.lock().unwrap(), vec![path]);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_scratch_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path());
        std::fs::create_dir_all(req.scratch_path.parent().unwrap()).unwrap();
        std::fs::write(&req.scratch_path, b"previous").unwrap();

        let clipboard = Arc::new(RecordingClipboard::default());
        let pipeline = StagingPipeline::new(Arc::new(AssetOnly { body: None }), clipboard.clone());

        let mut phases = Vec::new();
        let err = pipeline.run(req.clone(), |p| phases.push(p)).await.unwrap_err();

        assert!(matches!(err, GiffosError::Network(_)));
        assert_eq!(phases, [CopyPhase::Fetching]);
        assert_eq!(std::fs::read(&req.scratch_path).unwrap(), b"previous");
        assert!(clipboard.copied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clipboard_rejection_is_a_handoff_failure() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = Arc::new(RecordingClipboard {
            fail: true,
            ..Default::default()
        });
        let pipeline = StagingPipeline::new(Arc::new(AssetOnly { body: Some(b"GIF89a") }), clipboard);

        let err = pipeline.run(request(dir.path()), |_| {}).await.unwrap_err();
        assert_eq!(err, GiffosError::NativeHandoff("clipboard busy".into()));
    }

    #[tokio::test]
    async fn unwritable_scratch_is_a_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the cache directory should be.
        let blocker = dir.path().join("cache");
        std::fs::write(&blocker, b"").unwrap();

        let pipeline = StagingPipeline::new(
            Arc::new(AssetOnly { body: Some(b"GIF89a") }),
            Arc::new(RecordingClipboard::default()),
        );
        let err = pipeline.run(request(dir.path()), |_| {}).await.unwrap_err();
        assert!(matches!(err, GiffosError::Storage(_)));
    }

    #[tokio::test]
    async fn empty_download_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = StagingPipeline::new(
            Arc::new(AssetOnly { body: Some(b"") }),
            Arc::new(RecordingClipboard::default()),
        );
        let err = pipeline.run(request(dir.path()), |_| {}).await.unwrap_err();
        assert!(matches!(err, GiffosError::MalformedResponse(_)));
    }
}
