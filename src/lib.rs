//! REST API over two vehicle resources, cars and motorcycles.
//!
//! Requests flow controller -> service -> model -> document store. The
//! controller, service and model are generic over the resource, so both
//! resources share one validation policy and one error contract.

pub mod api;
pub mod config;
pub mod model;
pub mod resources;
pub mod service;
pub mod storage;
pub mod validation;
