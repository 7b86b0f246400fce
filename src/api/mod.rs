pub mod controller;
pub mod errors;
pub mod handlers;
pub mod routes;

pub use controller::{Controller, ControllerErrors};
pub use errors::ApiError;
pub use routes::create_router;
