//! Attribution configuration

use serde::{Deserialize, Serialize};

/// Attribution engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Run the Shapley explainer as the first tier
    pub library_enabled: bool,

    /// Largest feature count explained by exact coalition enumeration;
    /// wider rows use the permutation estimate
    pub max_exact_features: usize,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            library_enabled: true,
            max_exact_features: 10,
        }
    }
}

impl AttributionConfig {
    /// Coefficient and importance tiers only
    pub fn without_library() -> Self {
        Self {
            library_enabled: false,
            ..Default::default()
        }
    }
}
