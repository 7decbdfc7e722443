//! Serialized Bundle Layout

use crate::StorageError;
use inference_engine::{FeatureBundle, Model, ModelSpec};
use preprocess::{Imputer, StandardScaler, Transformer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// On-disk form of a fitted bundle, keyed by named parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRecord {
    pub model: ModelSpec,
    #[serde(default)]
    pub imputer: Option<Imputer>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub numeric_cols: Vec<String>,
}

impl BundleRecord {
    /// Check that both preprocessors were fitted on `numeric_cols`
    pub fn validate(&self) -> Result<(), StorageError> {
        let width = self.numeric_cols.len();
        let stages: [(&str, Option<usize>); 2] = [
            ("imputer", self.imputer.as_ref().map(|s| s.n_features())),
            ("scaler", self.scaler.as_ref().map(|s| s.n_features())),
        ];

        for (stage, fitted) in stages {
            if let Some(fitted) = fitted {
                if fitted != width {
                    return Err(StorageError::InvalidBundle(format!(
                        "{} fitted on {} columns but numeric_cols has {}",
                        stage, fitted, width
                    )));
                }
            }
        }
        Ok(())
    }

    /// Kind of the stored model
    pub fn model_kind(&self) -> &str {
        self.model.name()
    }

    /// Convert into the in-memory bundle
    pub fn into_bundle(self) -> FeatureBundle {
        let mut bundle = FeatureBundle::new(Arc::new(self.model), self.numeric_cols);
        if let Some(imputer) = self.imputer {
            bundle = bundle.with_imputer(Arc::new(imputer));
        }
        if let Some(scaler) = self.scaler {
            bundle = bundle.with_scaler(Arc::new(scaler));
        }
        bundle
    }
}
