//! Fitted Model Bundle

use crate::model::Model;
use preprocess::Transformer;
use std::fmt;
use std::sync::Arc;

/// Model, optional preprocessors and the canonical column order.
///
/// `numeric_cols` fixes the column order of every row and matrix built for
/// this bundle. Immutable once constructed.
#[derive(Clone)]
pub struct FeatureBundle {
    pub model: Arc<dyn Model>,
    pub imputer: Option<Arc<dyn Transformer>>,
    pub scaler: Option<Arc<dyn Transformer>>,
    pub numeric_cols: Vec<String>,
}

impl FeatureBundle {
    /// Bundle without preprocessors
    pub fn new(model: Arc<dyn Model>, numeric_cols: Vec<String>) -> Self {
        Self {
            model,
            imputer: None,
            scaler: None,
            numeric_cols,
        }
    }

    /// Attach an imputer stage
    pub fn with_imputer(mut self, imputer: Arc<dyn Transformer>) -> Self {
        self.imputer = Some(imputer);
        self
    }

    /// Attach a scaler stage
    pub fn with_scaler(mut self, scaler: Arc<dyn Transformer>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Number of canonical columns
    pub fn n_features(&self) -> usize {
        self.numeric_cols.len()
    }
}

impl fmt::Debug for FeatureBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureBundle")
            .field("model", &self.model.name())
            .field("imputer", &self.imputer.is_some())
            .field("scaler", &self.scaler.is_some())
            .field("numeric_cols", &self.numeric_cols)
            .finish()
    }
}
