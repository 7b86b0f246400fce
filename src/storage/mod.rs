use thiserror::Error;

pub mod object_id;
pub mod store;

pub use object_id::*;
pub use store::*;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage capacity exceeded for '{collection}': {current}/{limit}")]
    CapacityExceeded {
        collection: String,
        current: usize,
        limit: usize,
    },

    #[error("Document for '{collection}' is not a JSON object")]
    InvalidDocument { collection: String },

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {source}")]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    pub fn backend(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend {
            source: source.into(),
        }
    }
}
