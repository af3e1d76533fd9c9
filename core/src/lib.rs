//! Image rendition pipeline.
//!
//! An uploaded image is validated, downloaded and decoded once, then fanned
//! out into a small and a medium JPEG plus a verbatim copy of the original.
//! Every rendition is written through a [`storage::Storage`] backend.

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod plan;
pub mod storage;
pub mod task_group;

pub use config::{InboundEvent, ProcessingConfig, RenditionTarget};
pub use error::{ConfigError, ProcessingError};
pub use pipeline::Processor;
pub use storage::{LocalStorage, Storage, StorageError};
