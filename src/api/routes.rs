use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use super::controller::{Controller, ControllerErrors};
use super::handlers;
use crate::config::ApiConfig;
use crate::model::{CarModel, Model, MotorcycleModel};
use crate::resources::Resource;
use crate::service::{CarService, MotorcycleService};
use crate::storage::DocumentStore;

pub const CARS_ROUTE: &str = "/cars";
pub const MOTORCYCLES_ROUTE: &str = "/motorcycles";

pub fn create_router(store: DocumentStore, api: &ApiConfig) -> Router {
    let messages = api.messages.clone();

    let cars = Controller::new(CarService::new(CarModel::new(store.clone())), CARS_ROUTE)
        .with_errors(messages.clone());
    let motorcycles = Controller::new(
        MotorcycleService::new(MotorcycleModel::new(store)),
        MOTORCYCLES_ROUTE,
    )
    .with_errors(messages.clone());

    let router = Router::new()
        .merge(resource_routes(cars))
        .merge(resource_routes(motorcycles))
        // Health check
        .route("/health", get(handlers::health_check));

    apply_layers(router, &messages)
}

/// Collection and item routes for one resource, sharing its controller.
pub fn resource_routes<T: Resource, M: Model<T>>(controller: Controller<T, M>) -> Router {
    let collection = controller.route().to_string();
    let item = format!("{collection}/{{id}}");

    Router::new()
        .route(
            &collection,
            post(handlers::create::<T, M>).get(handlers::read::<T, M>),
        )
        .route(
            &item,
            get(handlers::read_one::<T, M>)
                .put(handlers::update::<T, M>)
                .delete(handlers::delete::<T, M>),
        )
        .with_state(Arc::new(controller))
}

/// Request tracing, plus a last-resort 500 for handler panics.
pub fn apply_layers(router: Router, messages: &ControllerErrors) -> Router {
    let internal = messages.internal.clone();
    router
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send>| {
            panic_response(&internal, panic)
        }))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(message: &str, panic: Box<dyn Any + Send>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
