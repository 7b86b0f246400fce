use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use super::{required, PayloadError, Resource, Vehicle};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Street,
    Custom,
    Trail,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Street, Category::Custom, Category::Trail];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Street => "Street",
            Category::Custom => "Custom",
            Category::Trail => "Trail",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or(())
    }
}

pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.parse::<Category>().is_err() {
        let mut error = ValidationError::new("invalid_enum_value");
        error.add_param("value".into(), &category);
        error.add_param("options".into(), &Category::ALL.map(|c| c.as_str()));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Motorcycle {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub category: Category,
    pub engine_capacity: i64,
}

impl Motorcycle {
    pub fn new(vehicle: Vehicle, category: Category, engine_capacity: i64) -> Self {
        Self {
            vehicle,
            category,
            engine_capacity,
        }
    }
}

/// Inbound motorcycle body with its field rules
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MotorcyclePayload {
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

    #[validate(required, custom(function = "validate_category"))]
    pub category: Option<String>,

    #[validate(required, range(min = 1, max = 2500))]
    pub engine_capacity: Option<i64>,
}

impl TryFrom<MotorcyclePayload> for Motorcycle {
    type Error = PayloadError;

    fn try_from(payload: MotorcyclePayload) -> Result<Self, Self::Error> {
        let vehicle = Vehicle::from_payload_fields(
            payload.model,
            payload.year,
            payload.color,
            payload.status,
            payload.buy_value,
        )?;
        let category = required(payload.category, "category")?
            .parse()
            .map_err(|_| PayloadError::InvalidField { field: "category" })?;
        Ok(Motorcycle::new(
            vehicle,
            category,
            required(payload.engine_capacity, "engineCapacity")?,
        ))
    }
}

impl Resource for Motorcycle {
    const COLLECTION: &'static str = "motorcycles";
    type Payload = MotorcyclePayload;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn honda() -> serde_json::Value {
        json!({
            "model": "Honda CG Titan 125",
            "year": 1963,
            "color": "red",
            "buyValue": 3500,
            "category": "Street",
            "engineCapacity": 125
        })
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Trail".parse::<Category>(), Ok(Category::Trail));
        assert!("trail".parse::<Category>().is_err());
        assert!(validate_category("Sport").is_err());
        assert!(validate_category("Custom").is_ok());
    }

    #[test]
    fn test_valid_payload_converts() {
        let payload: MotorcyclePayload = serde_json::from_value(honda()).unwrap();
        assert!(payload.validate().is_ok());

        let motorcycle = Motorcycle::try_from(payload).unwrap();
        assert_eq!(motorcycle.category, Category::Street);
        assert_eq!(motorcycle.engine_capacity, 125);
    }

    #[test]
    fn test_engine_capacity_boundaries() {
        for capacity in [1, 2500] {
            let mut body = honda();
            body["engineCapacity"] = json!(capacity);
            let payload: MotorcyclePayload = serde_json::from_value(body).unwrap();
            assert!(payload.validate().is_ok(), "{capacity} should be accepted");
        }

        for capacity in [0, 2501] {
            let mut body = honda();
            body["engineCapacity"] = json!(capacity);
            let payload: MotorcyclePayload = serde_json::from_value(body).unwrap();
            let errors = payload.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("engine_capacity"));
        }
    }

    #[test]
    fn test_year_boundaries() {
        for (year, accepted) in [(1899, false), (1900, true), (2022, true), (2023, false)] {
            let mut body = honda();
            body["year"] = json!(year);
            let payload: MotorcyclePayload = serde_json::from_value(body).unwrap();
            assert_eq!(payload.validate().is_ok(), accepted, "year {year}");
        }
    }

    #[test]
    fn test_unknown_category_is_a_rule_violation() {
        let mut body = honda();
        body["category"] = json!("Sport");
        body["engineCapacity"] = json!(3000);
        let payload: MotorcyclePayload = serde_json::from_value(body).unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 2);
        let category = fields
            .get("category")
            .map(|errors| errors[0].code.to_string());
        assert_eq!(category.as_deref(), Some("invalid_enum_value"));
    }

    #[test]
    fn test_category_serializes_verbatim() {
        let motorcycle = Motorcycle::new(Vehicle::new("Harley", 2000, "black", 90000), Category::Custom, 1600);
        let value = serde_json::to_value(&motorcycle).unwrap();
        assert_eq!(value["category"], "Custom");
        assert_eq!(value["engineCapacity"], 1600);
    }
}
