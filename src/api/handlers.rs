//! Axum entry points. Each one unpacks the request and hands it to the
//! resource's controller.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;

use super::controller::{Controller, Reply};
use super::errors::ApiError;
use crate::model::Model;
use crate::resources::{Document, Resource};

pub type SharedController<T, M> = State<Arc<Controller<T, M>>>;

pub async fn create<T: Resource, M: Model<T>>(
    State(controller): SharedController<T, M>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Reply<T>, ApiError> {
    let Json(payload) = payload?;
    controller.create(payload).await
}

pub async fn read<T: Resource, M: Model<T>>(
    State(controller): SharedController<T, M>,
) -> Result<Json<Vec<Document<T>>>, ApiError> {
    controller.read().await
}

pub async fn read_one<T: Resource, M: Model<T>>(
    State(controller): SharedController<T, M>,
    Path(id): Path<String>,
) -> Result<Reply<T>, ApiError> {
    controller.read_one(&id).await
}

pub async fn update<T: Resource, M: Model<T>>(
    State(controller): SharedController<T, M>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Reply<T>, ApiError> {
    let Json(payload) = payload?;
    controller.update(&id, payload).await
}

pub async fn delete<T: Resource, M: Model<T>>(
    State(controller): SharedController<T, M>,
    Path(id): Path<String>,
) -> Result<Reply<T>, ApiError> {
    controller.delete(&id).await
}

pub async fn health_check() -> &'static str {
    "OK"
}
