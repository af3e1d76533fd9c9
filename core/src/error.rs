use thiserror::Error;

use crate::storage::StorageError;

/// Failure of a single processing run.
///
/// Pre-flight failures (`InvalidLocation`, `UnsupportedFormat`) are raised
/// before any storage call. Per-rendition failures are always wrapped in
/// [`ProcessingError::Rendition`] so the caller can see which output path
/// failed.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("file {key} is not in the {expected_prefix} directory")]
    InvalidLocation {
        key: String,
        expected_prefix: String,
    },

    #[error("unsupported file format for {0}")]
    UnsupportedFormat(String),

    #[error("failed to download image {key}: {source}")]
    Download {
        key: String,
        source: StorageError,
    },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("upload failed: {0}")]
    Upload(StorageError),

    #[error("failed to process and upload {path}: {source}")]
    Rendition {
        path: String,
        source: Box<ProcessingError>,
    },

    #[error("rendition task aborted: {0}")]
    TaskAborted(String),

    #[error("failed to delete original image {key}: {source}")]
    Delete {
        key: String,
        source: StorageError,
    },
}

impl ProcessingError {
    /// Wrap a per-target failure with the target's output path.
    pub fn rendition(path: impl Into<String>, source: ProcessingError) -> Self {
        Self::Rendition {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Short name of the stage that failed, for logs and API responses.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidLocation { .. } | Self::UnsupportedFormat(_) => "validate",
            Self::Download { .. } => "download",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Upload(_) => "upload",
            Self::Rendition { source, .. } => source.stage(),
            Self::TaskAborted(_) => "fan-out",
            Self::Delete { .. } => "delete",
        }
    }

    /// Whether re-running (or re-deleting) without changing the input can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidLocation { .. } | Self::UnsupportedFormat(_) | Self::Decode(_) => false,
            Self::Rendition { source, .. } => source.is_retryable(),
            Self::Download { source, .. } | Self::Delete { source, .. } | Self::Upload(source) => {
                !matches!(source, StorageError::InvalidKey(_))
            }
            Self::Encode(_) | Self::TaskAborted(_) => true,
        }
    }

    /// Output path of the rendition that failed, if the failure was per-target.
    pub fn rendition_path(&self) -> Option<&str> {
        match self {
            Self::Rendition { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Startup configuration errors. Reported once, never a panic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(String),

    #[error("configuration value {0} must not be empty")]
    Empty(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}
