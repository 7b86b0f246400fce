use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::validation::ServiceError;

/// Everything a controller can answer with besides a record.
///
/// Plain failures serialize as `{"error": "<message>"}`; a validation failure
/// is returned as the `ServiceError` value itself.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid identifier: {message}")]
    InvalidId { message: String, status: StatusCode },

    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Validation(#[from] ServiceError),

    #[error("Malformed request body: {message}")]
    MalformedBody { message: String, status: StatusCode },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn invalid_id(message: impl Into<String>, status: StatusCode) -> Self {
        Self::InvalidId {
            message: message.into(),
            status,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { status, .. } => *status,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody { status, .. } => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidId { .. } => "invalid_id",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Validation(_) => "validation",
            ApiError::MalformedBody { .. } => "malformed_body",
            ApiError::Internal { .. } => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        debug!(error = %self, error_type = self.error_type(), %status, "request failed");
        match self {
            ApiError::Validation(error) => (status, Json(error)).into_response(),
            ApiError::InvalidId { message, .. }
            | ApiError::NotFound { message }
            | ApiError::MalformedBody { message, .. }
            | ApiError::Internal { message } => {
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody {
            message: rejection.body_text(),
            status: rejection.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Issue, IssueCode};

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_api_error_status_codes() {
        let response = ApiError::invalid_id("bad id", StatusCode::BAD_REQUEST).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::invalid_id("bad id", StatusCode::NOT_FOUND).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::not_found("Object not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::internal("Internal Server Error").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_plain_errors_have_message_body() {
        let response = ApiError::not_found("Object not found").into_response();
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Object not found" })
        );
    }

    #[tokio::test]
    async fn test_validation_error_body_is_the_service_error() {
        let error = ServiceError::new(vec![Issue::new(
            IssueCode::TooSmall,
            vec!["doorsQty".to_string()],
            "Number must be greater than or equal to 2",
        )]);
        let response = ApiError::from(error.clone()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::to_value(&error).unwrap());
        assert_eq!(body["error"]["issues"][0]["path"], json!(["doorsQty"]));
    }

    #[test]
    fn test_error_type_labels() {
        assert_eq!(ApiError::internal("x").error_type(), "internal");
        assert_eq!(ApiError::not_found("x").error_type(), "not_found");
    }
}
