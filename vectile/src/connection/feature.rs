//! Feature batch data model.
//!
//! The wire payload of a connection fetch. The tile tree classifies batches
//! purely by [`FeatureBatch::count`]; feature contents are opaque to it and
//! pass through to whatever consumes the loaded tree.

use serde::{Deserialize, Serialize};

/// A single point feature returned by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Source-assigned feature identifier
    pub id: u64,
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
}

/// The features fetched for one extent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBatch {
    features: Vec<Feature>,
}

impl FeatureBatch {
    /// Create a batch from its features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// A batch with no features.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of features in the batch.
    ///
    /// This is the only property the tile tree inspects.
    #[inline]
    pub fn count(&self) -> usize {
        self.features.len()
    }

    /// Whether the batch holds no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The contained features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }
}
