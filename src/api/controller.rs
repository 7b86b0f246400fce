use axum::{http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::errors::ApiError;
use crate::model::{Model, StoreModel};
use crate::resources::{Document, Resource};
use crate::service::{Outcome, Service};
use crate::storage::{StorageError, OBJECT_ID_HEX_LEN};

/// Messages sent in `{"error": ...}` bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerErrors {
    pub internal: String,
    pub not_found: String,
    pub required_id: String,
}

impl Default for ControllerErrors {
    fn default() -> Self {
        Self {
            internal: "Internal Server Error".to_string(),
            not_found: "Object not found".to_string(),
            required_id: "Id must have 24 hexadecimal characters".to_string(),
        }
    }
}

pub type Reply<T> = (StatusCode, Json<Document<T>>);

/// HTTP-facing side of one resource.
///
/// Every operation maps the service result onto the same outcomes: malformed
/// identifier, not found, validation failure, success, unexpected failure.
/// Only the service instance and the route differ between resources.
pub struct Controller<T, M = StoreModel<T>> {
    service: Service<T, M>,
    route: String,
    errors: ControllerErrors,
}

impl<T: Resource, M: Model<T>> Controller<T, M> {
    pub fn new(service: Service<T, M>, route: impl Into<String>) -> Self {
        Self {
            service,
            route: route.into(),
            errors: ControllerErrors::default(),
        }
    }

    pub fn with_errors(mut self, errors: ControllerErrors) -> Self {
        self.errors = errors;
        self
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn errors(&self) -> &ControllerErrors {
        &self.errors
    }

    pub async fn create(&self, payload: Value) -> Result<Reply<T>, ApiError> {
        match self.service.create(payload).await {
            Ok(Outcome::Done(document)) => Ok((StatusCode::CREATED, Json(document))),
            Ok(Outcome::Invalid(e)) => Err(e.into()),
            Ok(Outcome::Absent) => {
                error!(route = %self.route, "backend refused the write");
                Err(ApiError::internal(&self.errors.internal))
            }
            Err(e) => Err(self.unexpected("create", e)),
        }
    }

    pub async fn read(&self) -> Result<Json<Vec<Document<T>>>, ApiError> {
        self.service
            .read_all()
            .await
            .map(Json)
            .map_err(|e| self.unexpected("read", e))
    }

    pub async fn read_one(&self, id: &str) -> Result<Reply<T>, ApiError> {
        self.require_id(id, StatusCode::BAD_REQUEST)?;
        match self.service.read_one(id).await {
            Ok(Some(document)) => Ok((StatusCode::OK, Json(document))),
            Ok(None) => Err(self.not_found(id)),
            Err(e) => Err(self.unexpected("read_one", e)),
        }
    }

    pub async fn update(&self, id: &str, payload: Value) -> Result<Reply<T>, ApiError> {
        self.require_id(id, StatusCode::BAD_REQUEST)?;
        match self.service.update(id, payload).await {
            Ok(Outcome::Done(document)) => Ok((StatusCode::OK, Json(document))),
            Ok(Outcome::Invalid(e)) => Err(e.into()),
            Ok(Outcome::Absent) => Err(self.not_found(id)),
            Err(e) => Err(self.unexpected("update", e)),
        }
    }

    /// A short identifier is answered with 404 here, unlike the other operations.
    pub async fn delete(&self, id: &str) -> Result<Reply<T>, ApiError> {
        self.require_id(id, StatusCode::NOT_FOUND)?;
        match self.service.delete(id).await {
            Ok(Some(document)) => Ok((StatusCode::NO_CONTENT, Json(document))),
            Ok(None) => Err(self.not_found(id)),
            Err(e) => Err(self.unexpected("delete", e)),
        }
    }

    fn require_id(&self, id: &str, status: StatusCode) -> Result<(), ApiError> {
        if id.chars().count() < OBJECT_ID_HEX_LEN {
            debug!(route = %self.route, id, "identifier too short");
            return Err(ApiError::invalid_id(&self.errors.required_id, status));
        }
        Ok(())
    }

    fn not_found(&self, id: &str) -> ApiError {
        debug!(route = %self.route, id, "no matching document");
        ApiError::not_found(&self.errors.not_found)
    }

    /// Backend details are logged, never sent to the client.
    fn unexpected(&self, operation: &str, err: StorageError) -> ApiError {
        error!(route = %self.route, operation, error = %err, "unexpected failure");
        ApiError::internal(&self.errors.internal)
    }
}
