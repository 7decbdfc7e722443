//! Bundle Store Implementation

use crate::record::BundleRecord;
use crate::StorageError;
use inference_engine::FeatureBundle;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Encoding of the bundle file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFormat {
    /// serde_json document
    Json,
    /// postcard binary
    Postcard,
}

impl BundleFormat {
    /// Pick the format from the file extension; anything unrecognized is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("postcard") => BundleFormat::Postcard,
            _ => BundleFormat::Json,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<BundleRecord, StorageError> {
        Ok(match self {
            BundleFormat::Json => serde_json::from_slice(bytes)?,
            BundleFormat::Postcard => postcard::from_bytes(bytes)?,
        })
    }

    fn encode(&self, record: &BundleRecord) -> Result<Vec<u8>, StorageError> {
        Ok(match self {
            BundleFormat::Json => serde_json::to_vec_pretty(record)?,
            BundleFormat::Postcard => postcard::to_allocvec(record)?,
        })
    }
}

/// Single-file bundle store at a fixed path
pub struct BundleStore {
    path: PathBuf,
    format: BundleFormat,
    /// Keep the first successful reload for the process lifetime
    cache_reloads: bool,
    cached: Mutex<Option<Arc<FeatureBundle>>>,
}

impl BundleStore {
    /// Create a store for `path`, format inferred from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = BundleFormat::from_path(&path);
        debug!("Bundle store at {} ({:?})", path.display(), format);
        Self {
            path,
            format,
            cache_reloads: false,
            cached: Mutex::new(None),
        }
    }

    /// Enable or disable caching of fallback reloads
    pub fn with_reload_cache(mut self, enabled: bool) -> Self {
        self.cache_reloads = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> BundleFormat {
        self.format
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read, decode and validate the stored record
    pub fn load_record(&self) -> Result<BundleRecord, StorageError> {
        if !self.exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }

        let bytes = std::fs::read(&self.path)?;
        let record = self.format.decode(&bytes)?;
        record.validate()?;
        Ok(record)
    }

    /// Load the bundle for serving
    pub fn load(&self) -> Result<FeatureBundle, StorageError> {
        let record = self.load_record()?;
        info!(
            "Loaded {} bundle with {} features from {}",
            record.model_kind(),
            record.numeric_cols.len(),
            self.path.display()
        );
        Ok(record.into_bundle())
    }

    /// Write `record`, creating parent directories as needed
    pub fn save(&self, record: &BundleRecord) -> Result<(), StorageError> {
        record.validate()?;
        let bytes = self.format.encode(record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, bytes)?;

        info!("Saved bundle to {}", self.path.display());
        Ok(())
    }

    /// Fresh load used as an attribution data source.
    ///
    /// A missing file is `Ok(None)`; decode failures are errors for the
    /// caller to log.
    pub fn reload(&self) -> Result<Option<Arc<FeatureBundle>>, StorageError> {
        if self.cache_reloads {
            let cached = self.cached.lock().map_err(|e| StorageError::Lock(e.to_string()))?;
            if let Some(bundle) = cached.as_ref() {
                debug!("Using cached reload of {}", self.path.display());
                return Ok(Some(Arc::clone(bundle)));
            }
        }

        if !self.exists() {
            warn!("Saved bundle not found at {}", self.path.display());
            return Ok(None);
        }

        let bundle = Arc::new(self.load_record()?.into_bundle());
        info!("Reloaded saved bundle from {} for fallback", self.path.display());

        if self.cache_reloads {
            let mut cached = self.cached.lock().map_err(|e| StorageError::Lock(e.to_string()))?;
            *cached = Some(Arc::clone(&bundle));
        }

        Ok(Some(bundle))
    }
}
