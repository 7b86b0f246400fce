//! Validation-then-delegate layer between controllers and models.

use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use crate::model::{Model, StoreModel};
use crate::resources::{Car, Document, Motorcycle, Resource};
use crate::storage::StorageError;
use crate::validation::{parse_payload, ServiceError};

/// Result of a write: the stored record, nothing, or the validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(Document<T>),
    Absent,
    Invalid(ServiceError),
}

impl<T> From<Option<Document<T>>> for Outcome<T> {
    fn from(document: Option<Document<T>>) -> Self {
        match document {
            Some(document) => Outcome::Done(document),
            None => Outcome::Absent,
        }
    }
}

pub struct Service<T, M = StoreModel<T>> {
    model: M,
    _resource: PhantomData<fn() -> T>,
}

pub type CarService = Service<Car>;
pub type MotorcycleService = Service<Motorcycle>;

impl<T: Resource, M: Model<T>> Service<T, M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            _resource: PhantomData,
        }
    }

    /// Validates `payload` and stores it. Invalid payloads never reach the model.
    pub async fn create(&self, payload: Value) -> Result<Outcome<T>, StorageError> {
        let data = match parse_payload::<T>(payload) {
            Ok(data) => data,
            Err(e) => return Ok(Self::rejected(e)),
        };
        Ok(self.model.create(data).await?.into())
    }

    pub async fn read_all(&self) -> Result<Vec<Document<T>>, StorageError> {
        self.model.read_all().await
    }

    pub async fn read_one(&self, id: &str) -> Result<Option<Document<T>>, StorageError> {
        self.model.read_one(id).await
    }

    /// Full-document update: the payload is checked against the whole schema.
    pub async fn update(&self, id: &str, payload: Value) -> Result<Outcome<T>, StorageError> {
        let data = match parse_payload::<T>(payload) {
            Ok(data) => data,
            Err(e) => return Ok(Self::rejected(e)),
        };
        Ok(self.model.update(id, data).await?.into())
    }

    pub async fn delete(&self, id: &str) -> Result<Option<Document<T>>, StorageError> {
        self.model.delete(id).await
    }

    fn rejected(error: ServiceError) -> Outcome<T> {
        debug!(collection = T::COLLECTION, fields = ?error.fields(), "payload rejected");
        Outcome::Invalid(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DocumentStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts writes that reach the model
    #[derive(Default, Clone)]
    struct CountingModel {
        writes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Model<Car> for CountingModel {
        async fn create(&self, _data: Car) -> Result<Option<Document<Car>>, StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn read_all(&self) -> Result<Vec<Document<Car>>, StorageError> {
            Ok(Vec::new())
        }

        async fn read_one(&self, _id: &str) -> Result<Option<Document<Car>>, StorageError> {
            Ok(None)
        }

        async fn update(&self, _id: &str, _data: Car) -> Result<Option<Document<Car>>, StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn delete(&self, _id: &str) -> Result<Option<Document<Car>>, StorageError> {
            Ok(None)
        }
    }

    fn ferrari() -> Value {
        json!({
            "model": "Ferrari Maranello",
            "year": 1963,
            "color": "red",
            "buyValue": 3500000,
            "seatsQty": 2,
            "doorsQty": 2
        })
    }

    #[tokio::test]
    async fn test_create_valid_payload() {
        let service = CarService::new(StoreModel::new(DocumentStore::new()));

        let Outcome::Done(created) = service.create(ferrari()).await.unwrap() else {
            panic!("expected a stored car");
        };
        assert_eq!(created.body.vehicle.model, "Ferrari Maranello");

        let found = service.read_one(&created.id.to_string()).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_model() {
        let model = CountingModel::default();
        let service: Service<Car, _> = Service::new(model.clone());

        let mut body = ferrari();
        body["doorsQty"] = json!(0);
        body["seatsQty"] = json!(12);

        let outcome = service.create(body.clone()).await.unwrap();
        let Outcome::Invalid(error) = outcome else {
            panic!("expected a validation failure");
        };
        assert_eq!(error.fields(), vec!["doorsQty", "seatsQty"]);

        let outcome = service
            .update("4edd40c86762e0fb12000009", body)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Invalid(_)));

        assert_eq!(model.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refused_create_is_absent() {
        let model = CountingModel::default();
        let service: Service<Car, _> = Service::new(model.clone());

        let outcome = service.create(ferrari()).await.unwrap();
        assert_eq!(outcome, Outcome::Absent);
        assert_eq!(model.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_absent() {
        let service = CarService::new(StoreModel::new(DocumentStore::new()));
        let outcome = service
            .update("4edd40c86762e0fb12000009", ferrari())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Absent);
    }

    #[tokio::test]
    async fn test_update_and_delete_existing() {
        let service = CarService::new(StoreModel::new(DocumentStore::new()));
        let Outcome::Done(stored) = service.create(ferrari()).await.unwrap() else {
            panic!("expected a stored car");
        };
        let id = stored.id.to_string();

        let mut camaro = ferrari();
        camaro["model"] = json!("Camaro");
        let Outcome::Done(updated) = service.update(&id, camaro).await.unwrap() else {
            panic!("expected an updated car");
        };
        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.body.vehicle.model, "Camaro");

        assert!(service.delete(&id).await.unwrap().is_some());
        assert!(service.delete(&id).await.unwrap().is_none());
        assert!(service.read_all().await.unwrap().is_empty());
    }
}
