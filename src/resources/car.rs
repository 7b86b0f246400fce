use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{required, PayloadError, Resource, Vehicle};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub doors_qty: i64,
    pub seats_qty: i64,
}

impl Car {
    pub fn new(vehicle: Vehicle, doors_qty: i64, seats_qty: i64) -> Self {
        Self {
            vehicle,
            doors_qty,
            seats_qty,
        }
    }
}

/// Inbound car body with its field rules
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    #[validate(
        required(message = "Model is required"),
        length(min = 3, message = "Model must be 3 or more characters long")
    )]
    pub model: Option<String>,

    #[validate(required, range(min = 1900, max = 2022))]
    pub year: Option<i64>,

    #[validate(
        required(message = "Color is required"),
        length(min = 3, message = "Color must be 3 or more characters long")
    )]
    pub color: Option<String>,

    pub status: Option<bool>,

    #[validate(required)]
    pub buy_value: Option<i64>,

    #[validate(required, range(min = 2, max = 4))]
    pub doors_qty: Option<i64>,

    #[validate(required, range(min = 2, max = 7))]
    pub seats_qty: Option<i64>,
}

impl TryFrom<CarPayload> for Car {
    type Error = PayloadError;

    fn try_from(payload: CarPayload) -> Result<Self, Self::Error> {
        let vehicle = Vehicle::from_payload_fields(
            payload.model,
            payload.year,
            payload.color,
            payload.status,
            payload.buy_value,
        )?;
        Ok(Car::new(
            vehicle,
            required(payload.doors_qty, "doorsQty")?,
            required(payload.seats_qty, "seatsQty")?,
        ))
    }
}

impl Resource for Car {
    const COLLECTION: &'static str = "cars";
    type Payload = CarPayload;
}
