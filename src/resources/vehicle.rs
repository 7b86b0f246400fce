use serde::{Deserialize, Serialize};

use super::{required, PayloadError};

/// Fields shared by every vehicle kind. Never stored on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub model: String,
    pub year: i64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    pub buy_value: i64,
}

impl Vehicle {
    pub fn new(model: impl Into<String>, year: i64, color: impl Into<String>, buy_value: i64) -> Self {
        Self {
            model: model.into(),
            year,
            color: color.into(),
            status: None,
            buy_value,
        }
    }

    pub fn with_status(mut self, status: bool) -> Self {
        self.status = Some(status);
        self
    }

    /// Assembles the shared fields of a validated payload
    pub(crate) fn from_payload_fields(
        model: Option<String>,
        year: Option<i64>,
        color: Option<String>,
        status: Option<bool>,
        buy_value: Option<i64>,
    ) -> Result<Self, PayloadError> {
        Ok(Self {
            model: required(model, "model")?,
            year: required(year, "year")?,
            color: required(color, "color")?,
            status,
            buy_value: required(buy_value, "buyValue")?,
        })
    }
}
