//! Resource types exposed over the API and the schemas their payloads are
//! checked against.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use validator::Validate;

use crate::storage::ObjectId;

pub mod car;
pub mod motorcycle;
pub mod vehicle;

pub use car::*;
pub use motorcycle::*;
pub use vehicle::*;

/// A kind of record stored in its own collection.
///
/// `Payload` is the inbound shape with every field optional so that missing
/// fields are reported as rule violations instead of decode failures. Once a
/// payload passes validation it converts into the resource.
pub trait Resource: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Collection name in the document store
    const COLLECTION: &'static str;

    type Payload: DeserializeOwned + Validate + TryInto<Self, Error = PayloadError> + Send;
}

/// Raised when a payload that passed validation still cannot be converted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Field '{field}' is required")]
    MissingField { field: &'static str },

    #[error("Field '{field}' holds an unexpected value")]
    InvalidField { field: &'static str },
}

impl PayloadError {
    pub fn field(&self) -> &'static str {
        match self {
            PayloadError::MissingField { field } | PayloadError::InvalidField { field } => field,
        }
    }
}

pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, PayloadError> {
    value.ok_or(PayloadError::MissingField { field })
}

/// A stored record: the backend identifier plus the resource fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document<T> {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Document<T> {
    pub fn new(id: ObjectId, body: T) -> Self {
        Self { id, body }
    }
}
