//! Error types for loading health data

use thiserror::Error;

use crate::types::Partition;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {partition} document: {reason}")]
    InvalidDocument {
        partition: Partition,
        reason: String,
    },

    #[error("failed to load {partition} data: {source}")]
    Partition {
        partition: Partition,
        #[source]
        source: Box<HealthError>,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl HealthError {
    /// Attach the partition that was being loaded when the error happened.
    pub fn in_partition(self, partition: Partition) -> Self {
        match self {
            HealthError::Partition { .. } | HealthError::InvalidDocument { .. } => self,
            other => HealthError::Partition {
                partition,
                source: Box::new(other),
            },
        }
    }
}

pub type HealthResult<T> = Result<T, HealthError>;
