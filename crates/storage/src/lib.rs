//! Storage Layer
//!
//! Persists fitted model bundles and loads them back at startup or as an
//! attribution fallback data source.

mod record;
mod store;

pub use record::BundleRecord;
pub use store::{BundleFormat, BundleStore};

use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bundle not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

impl From<postcard::Error> for StorageError {
    fn from(e: postcard::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}
