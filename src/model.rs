//! Persistence layer: one model per resource over the document store.
//!
//! Models trust their callers and never validate. Absence is `Ok(None)`,
//! including identifiers the backend cannot parse; only genuine backend
//! failures come back as `Err`.

use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::resources::{Car, Document, Motorcycle, Resource};
use crate::storage::{DocumentStore, Fields, ObjectId, StorageError};

#[async_trait]
pub trait Model<T: Resource>: Send + Sync + 'static {
    /// Stores a new document. `None` when the backend refuses the write.
    async fn create(&self, data: T) -> Result<Option<Document<T>>, StorageError>;

    async fn read_all(&self) -> Result<Vec<Document<T>>, StorageError>;

    async fn read_one(&self, id: &str) -> Result<Option<Document<T>>, StorageError>;

    /// Replaces every field of the document, keeping its identifier.
    async fn update(&self, id: &str, data: T) -> Result<Option<Document<T>>, StorageError>;

    async fn delete(&self, id: &str) -> Result<Option<Document<T>>, StorageError>;
}

/// Generic model storing `T` in the collection named by `T::COLLECTION`.
pub struct StoreModel<T> {
    store: DocumentStore,
    _resource: PhantomData<fn() -> T>,
}

pub type CarModel = StoreModel<Car>;
pub type MotorcycleModel = StoreModel<Motorcycle>;

impl<T: Resource> StoreModel<T> {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            _resource: PhantomData,
        }
    }

    fn parse_id(id: &str) -> Option<ObjectId> {
        match id.parse() {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(collection = T::COLLECTION, error = %e, "treating unparseable identifier as absent");
                None
            }
        }
    }

    fn decode(id: ObjectId, fields: Fields) -> Result<Document<T>, StorageError> {
        let body = serde_json::from_value(Value::Object(fields))?;
        Ok(Document::new(id, body))
    }
}

impl<T> Clone for StoreModel<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Resource> Model<T> for StoreModel<T> {
    async fn create(&self, data: T) -> Result<Option<Document<T>>, StorageError> {
        let document = serde_json::to_value(&data)?;
        match self.store.insert(T::COLLECTION, document) {
            Ok((id, fields)) => Ok(Some(Self::decode(id, fields)?)),
            Err(StorageError::CapacityExceeded { current, limit, .. }) => {
                warn!(collection = T::COLLECTION, current, limit, "write refused, collection is full");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn read_all(&self) -> Result<Vec<Document<T>>, StorageError> {
        self.store
            .find_all(T::COLLECTION)
            .into_iter()
            .map(|(id, fields)| Self::decode(id, fields))
            .collect()
    }

    async fn read_one(&self, id: &str) -> Result<Option<Document<T>>, StorageError> {
        let Some(id) = Self::parse_id(id) else {
            return Ok(None);
        };
        self.store
            .find_one(T::COLLECTION, &id)
            .map(|fields| Self::decode(id, fields))
            .transpose()
    }

    async fn update(&self, id: &str, data: T) -> Result<Option<Document<T>>, StorageError> {
        let Some(id) = Self::parse_id(id) else {
            return Ok(None);
        };
        let document = serde_json::to_value(&data)?;
        self.store
            .replace(T::COLLECTION, &id, document)?
            .map(|fields| Self::decode(id, fields))
            .transpose()
    }

    async fn delete(&self, id: &str) -> Result<Option<Document<T>>, StorageError> {
        let Some(id) = Self::parse_id(id) else {
            return Ok(None);
        };
        self.store
            .remove(T::COLLECTION, &id)
            .map(|fields| Self::decode(id, fields))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StorageBehaviorConfig, StorageConfig, StorageLimitsConfig};
    use crate::resources::{Category, Vehicle};

    fn ferrari() -> Car {
        Car::new(Vehicle::new("Ferrari Maranello", 1963, "red", 3500000), 2, 2)
    }

    #[tokio::test]
    async fn test_create_assigns_identifier() {
        let model = CarModel::new(DocumentStore::new());
        let created = model.create(ferrari()).await.unwrap().unwrap();

        assert_eq!(created.body, ferrari());
        assert_eq!(created.id.to_string().len(), 24);

        let found = model.read_one(&created.id.to_string()).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_read_all_per_collection() {
        let store = DocumentStore::new();
        let cars = CarModel::new(store.clone());
        let motorcycles = MotorcycleModel::new(store);

        assert!(cars.read_all().await.unwrap().is_empty());

        cars.create(ferrari()).await.unwrap();
        motorcycles
            .create(Motorcycle::new(
                Vehicle::new("Honda CG Titan 125", 1963, "red", 3500),
                Category::Street,
                125,
            ))
            .await
            .unwrap();

        assert_eq!(cars.read_all().await.unwrap().len(), 1);
        assert_eq!(motorcycles.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_identifiers_are_absent() {
        let model = CarModel::new(DocumentStore::new());
        for id in ["aa", "not-a-valid-identifier-at-all", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(model.read_one(id).await.unwrap().is_none());
            assert!(model.update(id, ferrari()).await.unwrap().is_none());
            assert!(model.delete(id).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_id() {
        let model = CarModel::new(DocumentStore::new());
        let created = model
            .create(Car::new(
                Vehicle::new("Ferrari Maranello", 1963, "red", 3500000).with_status(true),
                2,
                2,
            ))
            .await
            .unwrap()
            .unwrap();
        let id = created.id.to_string();

        let camaro = Car::new(Vehicle::new("Camaro", 1963, "red", 3500000), 2, 2);
        let updated = model.update(&id, camaro.clone()).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.body, camaro);
        assert_eq!(updated.body.vehicle.status, None);
        assert_eq!(model.read_one(&id).await.unwrap().unwrap().body, camaro);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let model = CarModel::new(DocumentStore::new());
        let result = model
            .update("4edd40c86762e0fb12000009", ferrari())
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(model.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let model = CarModel::new(DocumentStore::new());
        let created = model.create(ferrari()).await.unwrap().unwrap();
        let id = created.id.to_string();

        assert_eq!(model.delete(&id).await.unwrap(), Some(created));
        assert_eq!(model.delete(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refused_write_is_none() {
        let store = DocumentStore::with_config(StorageConfig {
            limits: StorageLimitsConfig {
                max_documents_per_collection: 1,
            },
            behavior: StorageBehaviorConfig {
                reject_on_capacity: true,
            },
        });
        let model = CarModel::new(store);

        assert!(model.create(ferrari()).await.unwrap().is_some());
        assert!(model.create(ferrari()).await.unwrap().is_none());
    }
}
