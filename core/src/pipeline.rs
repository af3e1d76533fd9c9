use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::{self, DecodedImage};
use crate::config::{InboundEvent, ProcessingConfig, RenditionTarget};
use crate::error::ProcessingError;
use crate::format::ImageFormat;
use crate::plan::{base_filename, build_targets};
use crate::storage::{Storage, StorageError, StorageResult};
use crate::task_group::TaskGroup;

/// Turns one uploaded image into its renditions.
///
/// A run validates the event, downloads and decodes the source once, then
/// resizes and uploads every rendition concurrently. All rendition tasks run
/// to completion before the outcome is decided, and the source is deleted
/// only when every upload succeeded.
///
/// When several renditions fail, the error of whichever failed task finished
/// first is returned; all failures are logged. Nothing is retried and
/// uploads that already succeeded are not rolled back.
pub struct Processor {
    storage: Arc<dyn Storage>,
    config: ProcessingConfig,
    io_timeout: Option<Duration>,
}

impl Processor {
    pub fn new(storage: Arc<dyn Storage>, config: ProcessingConfig) -> Self {
        Self {
            storage,
            config,
            io_timeout: None,
        }
    }

    /// Bound each download, upload and delete call individually.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    /// Pre-flight checks. No storage call is made.
    pub fn validate(&self, event: &InboundEvent) -> Result<ImageFormat, ProcessingError> {
        validate_key(&self.config, &event.key)
    }

    /// The renditions a valid event would produce.
    pub fn plan(&self, event: &InboundEvent) -> Vec<RenditionTarget> {
        build_targets(&self.config, base_filename(&event.key))
    }

    pub async fn process(
        &self,
        event: &InboundEvent,
        delete_source: bool,
    ) -> Result<(), ProcessingError> {
        let container = event.container.as_str();
        let key = event.key.as_str();
        log::info!("Processing image {container}/{key}");

        let format = self.validate(event).inspect_err(|e| {
            log::error!("Rejected {container}/{key}: {e}");
        })?;

        let data = self
            .with_timeout(self.storage.download(container, key))
            .await
            .map_err(|source| ProcessingError::Download {
                key: key.to_string(),
                source,
            })
            .inspect_err(|e| log::error!("{e}"))?;
        log::debug!("Downloaded {key}: {} bytes ({})", data.len(), format.as_str());

        let data: Arc<Vec<u8>> = Arc::new(data);
        let image = decode_blocking(data.clone())
            .await
            .inspect_err(|e| log::error!("Failed to decode {key}: {e}"))?;

        let targets = self.plan(event);
        let mut group = TaskGroup::new();
        for target in targets {
            let storage = self.storage.clone();
            let container = container.to_string();
            let image = image.clone();
            let data = data.clone();
            let io_timeout = self.io_timeout;
            group.spawn(target.output_path.clone(), async move {
                render_and_upload(storage, &container, image, data, &target, io_timeout).await
            });
        }

        let mut first_error = None;
        for outcome in group.join_all().await {
            let err = match outcome.result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(join_error) => ProcessingError::rendition(
                    outcome.label,
                    ProcessingError::TaskAborted(join_error),
                ),
            };
            log::error!("Error during processing: {err}");
            first_error.get_or_insert(err);
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        log::info!("Successfully processed images for {key}");

        if delete_source {
            self.with_timeout(self.storage.delete(container, key))
                .await
                .map_err(|source| ProcessingError::Delete {
                    key: key.to_string(),
                    source,
                })
                .inspect_err(|e| log::error!("{e}"))?;
            log::info!("Original image {key} deleted");
        } else {
            log::debug!("Keeping original image {key}");
        }

        log::info!("Image processing completed for {container}/{key}");
        Ok(())
    }

    async fn with_timeout<T, F>(&self, call: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        with_timeout(self.io_timeout, call).await
    }
}

/// The key must sit under the source prefix and carry a supported extension.
pub fn validate_key(config: &ProcessingConfig, key: &str) -> Result<ImageFormat, ProcessingError> {
    if !key.starts_with(&config.source_dir) {
        return Err(ProcessingError::InvalidLocation {
            key: key.to_string(),
            expected_prefix: config.source_dir.clone(),
        });
    }

    ImageFormat::from_key(key).ok_or_else(|| ProcessingError::UnsupportedFormat(key.to_string()))
}

async fn with_timeout<T, F>(timeout: Option<Duration>, call: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| StorageError::Timeout(limit))?,
        None => call.await,
    }
}

async fn decode_blocking(data: Arc<Vec<u8>>) -> Result<Arc<DecodedImage>, ProcessingError> {
    tokio::task::spawn_blocking(move || codec::decode(&data))
        .await
        .map_err(|e| ProcessingError::Decode(format!("decoder task failed: {e}")))?
        .map(Arc::new)
}

/// One rendition: passthrough or resize+encode, then upload.
async fn render_and_upload(
    storage: Arc<dyn Storage>,
    container: &str,
    image: Arc<DecodedImage>,
    source: Arc<Vec<u8>>,
    target: &RenditionTarget,
    io_timeout: Option<Duration>,
) -> Result<(), ProcessingError> {
    let path = target.output_path.as_str();

    let output = if target.is_passthrough {
        source.as_ref().clone()
    } else {
        let (width, quality) = (target.width, target.quality);
        tokio::task::spawn_blocking(move || codec::resize_and_encode(&image, width, quality))
            .await
            .map_err(|e| ProcessingError::rendition(path, ProcessingError::TaskAborted(e.to_string())))?
            .map_err(|e| ProcessingError::rendition(path, e))?
    };

    let size = output.len();
    with_timeout(io_timeout, storage.upload(container, path, output))
        .await
        .map_err(|e| ProcessingError::rendition(path, ProcessingError::Upload(e)))?;

    log::debug!("Uploaded {} rendition {path} ({size} bytes)", target.name);
    Ok(())
}
