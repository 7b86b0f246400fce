use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use super::{ObjectId, StorageError};
use crate::config::{StorageBehaviorConfig, StorageConfig, StorageLimitsConfig};

/// A stored document body, keyed by its identifier.
pub type Fields = Map<String, Value>;

type Collection = Arc<DashMap<ObjectId, Fields>>;

/// In-process document database: named collections of JSON objects.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    collections: Arc<DashMap<String, Collection>>,
    config: StorageConfig,
}

impl DocumentStore {
    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            collections: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Creates a DocumentStore with default configuration for testing
    pub fn new() -> Self {
        Self::with_config(StorageConfig {
            limits: StorageLimitsConfig {
                max_documents_per_collection: 10_000,
            },
            behavior: StorageBehaviorConfig {
                reject_on_capacity: true,
            },
        })
    }

    fn collection(&self, name: &str) -> Collection {
        if let Some(existing) = self.collections.get(name) {
            return existing.value().clone();
        }
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DashMap::new()))
            .value()
            .clone()
    }

    fn into_fields(collection: &str, document: Value) -> Result<Fields, StorageError> {
        match document {
            Value::Object(fields) => Ok(fields),
            _ => Err(StorageError::InvalidDocument {
                collection: collection.to_string(),
            }),
        }
    }

    pub fn insert(&self, collection: &str, document: Value) -> Result<(ObjectId, Fields), StorageError> {
        let fields = Self::into_fields(collection, document)?;

        // The entry guard is held until the write lands; inserts into one
        // collection are serialized.
        let entry = self
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(DashMap::new()));
        let documents = entry.value();

        let current = documents.len();
        let limit = self.config.limits.max_documents_per_collection;
        if current >= limit {
            if self.config.behavior.reject_on_capacity {
                return Err(StorageError::CapacityExceeded {
                    collection: collection.to_string(),
                    current,
                    limit,
                });
            }
            warn!(collection, current, limit, "collection is over capacity, accepting write");
        }

        let id = ObjectId::new();
        documents.insert(id, fields.clone());
        Ok((id, fields))
    }

    /// All documents of a collection, ordered by identifier
    pub fn find_all(&self, collection: &str) -> Vec<(ObjectId, Fields)> {
        let mut documents: Vec<(ObjectId, Fields)> = self
            .collection(collection)
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        documents.sort_by_key(|(id, _)| *id);
        documents
    }

    pub fn find_one(&self, collection: &str, id: &ObjectId) -> Option<Fields> {
        self.collection(collection).get(id).map(|d| d.value().clone())
    }

    /// Swaps the whole body of an existing document. Absent documents are left absent.
    pub fn replace(
        &self,
        collection: &str,
        id: &ObjectId,
        document: Value,
    ) -> Result<Option<Fields>, StorageError> {
        let fields = Self::into_fields(collection, document)?;
        let documents = self.collection(collection);
        let replaced = documents.get_mut(id).map(|mut existing| {
            *existing = fields;
            existing.value().clone()
        });
        Ok(replaced)
    }

    pub fn remove(&self, collection: &str, id: &ObjectId) -> Option<Fields> {
        self.collection(collection).remove(id).map(|(_, fields)| fields)
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collection(collection).len()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}
