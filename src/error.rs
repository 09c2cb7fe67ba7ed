//! Error taxonomy for admin lookups.
//!
//! A point outside every polygon is not an error; it is `None` in the
//! lookup result.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::AdminLevel;

pub type Result<T, E = LookupError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LookupError {
    /// Latitude/longitude missing, non-numeric, non-finite or out of range
    #[error("Invalid (lat, lng) input.")]
    InvalidCoordinate,

    /// Accuracy config is not a keyed structure or misses a required numeric key
    #[error("Invalid accuracyLevel input: {0}")]
    InvalidAccuracyConfig(String),

    /// No dataset exists for the selected accuracy value
    #[error("Cannot find dataset {dataset} for {level} at accuracy level {accuracy}. Please import the dataset.")]
    DatasetNotFound {
        level: AdminLevel,
        accuracy: i64,
        dataset: String,
    },

    /// The dataset could not be decoded as a feature collection
    #[error("Dataset {dataset} is corrupt: {reason}")]
    DatasetCorrupt { dataset: String, reason: String },

    #[error("Failed to read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lookup exceeded deadline of {0:?}")]
    Timeout(Duration),
}

impl LookupError {
    /// Whether the caller supplied bad input (as opposed to a data or I/O fault)
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            LookupError::InvalidCoordinate | LookupError::InvalidAccuracyConfig(_)
        )
    }
}
