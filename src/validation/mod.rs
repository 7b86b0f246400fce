//! Validation policy shared by every resource.
//!
//! Payload rules are declared on each resource's payload type with
//! `validator` attributes. This module runs them and turns every violation
//! into an [`Issue`], so a single response can report all problems at once.
//! A failed validation is returned as a [`ServiceError`] value, never raised.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::resources::{PayloadError, Resource};

pub const VALIDATION_ERROR_NAME: &str = "ValidationError";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidEnumValue,
    Custom,
}

/// One violated rule: where it happened and what is wrong.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Issue {
    pub fn new(code: IssueCode, path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
            minimum: None,
            maximum: None,
            inclusive: None,
            options: None,
        }
    }

    pub fn required(path: Vec<String>) -> Self {
        Self::new(IssueCode::InvalidType, path, "Required")
    }

    /// Whole-payload shape problem: the body is not a JSON object
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::new(IssueCode::InvalidType, Vec::new(), message)
    }

    /// A field holding the wrong JSON type
    pub fn mistyped(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(IssueCode::InvalidType, vec![field.into()], message)
    }

    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

impl From<PayloadError> for Issue {
    fn from(err: PayloadError) -> Self {
        let path = vec![err.field().to_string()];
        match err {
            PayloadError::MissingField { .. } => Issue::required(path),
            PayloadError::InvalidField { .. } => {
                Issue::new(IssueCode::Custom, path, err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issues {
    pub name: String,
    pub issues: Vec<Issue>,
}

/// Validation failure returned by a service instead of a record.
///
/// Serializes as `{"error": {"name": "ValidationError", "issues": [...]}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Error)]
#[error("payload failed validation with {} issue(s)", .error.issues.len())]
pub struct ServiceError {
    pub error: Issues,
}

impl ServiceError {
    pub fn new(mut issues: Vec<Issue>) -> Self {
        issues.sort_by(|a, b| a.path.cmp(&b.path).then(a.code.cmp(&b.code)));
        Self {
            error: Issues {
                name: VALIDATION_ERROR_NAME.to_string(),
                issues,
            },
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.error.issues
    }

    /// Fields with at least one violation, in issue order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.issues().iter().filter_map(Issue::field).collect();
        fields.dedup();
        fields
    }
}

impl From<PayloadError> for ServiceError {
    fn from(err: PayloadError) -> Self {
        ServiceError::new(vec![err.into()])
    }
}

/// Decodes and checks a raw payload against the schema of `T`.
///
/// Every field rule is evaluated; the error carries one issue per violation.
/// A field of the wrong JSON type gets a single `invalid_type` issue at its
/// path and the rules of the remaining fields still run.
pub fn parse_payload<T: Resource>(payload: Value) -> Result<T, ServiceError> {
    let fields = match payload {
        Value::Object(fields) => fields,
        other => {
            let message = format!("Expected object, received {}", json_kind(&other));
            return Err(ServiceError::new(vec![Issue::invalid_type(message)]));
        }
    };

    let (readable, mut issues) = split_mistyped::<T::Payload>(fields);
    let mistyped: HashSet<String> = issues.iter().flat_map(|i| i.path.clone()).collect();

    let payload: T::Payload = serde_json::from_value(Value::Object(readable))
        .map_err(|e| ServiceError::new(vec![Issue::invalid_type(e.to_string())]))?;

    if let Err(errors) = payload.validate() {
        let mut violations = Vec::new();
        collect_issues(&errors, &[], &mut violations);
        issues.extend(
            violations
                .into_iter()
                .filter(|issue| issue.field().map_or(true, |f| !mistyped.contains(f))),
        );
    }

    if !issues.is_empty() {
        return Err(ServiceError::new(issues));
    }
    Ok(payload.try_into()?)
}

/// Decodes every field on its own against `P` and sets aside those of the
/// wrong type. Payload fields are all optional, so a one-field object only
/// fails when that field cannot be read.
fn split_mistyped<P: DeserializeOwned>(fields: Map<String, Value>) -> (Map<String, Value>, Vec<Issue>) {
    let mut readable = Map::new();
    let mut issues = Vec::new();

    for (name, value) in fields {
        let mut single = Map::new();
        single.insert(name.clone(), value.clone());
        match serde_json::from_value::<P>(Value::Object(single)) {
            Ok(_) => {
                readable.insert(name, value);
            }
            Err(e) => issues.push(Issue::mistyped(name, e.to_string())),
        }
    }

    (readable, issues)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn collect_issues(errors: &ValidationErrors, prefix: &[String], issues: &mut Vec<Issue>) {
    for (field, kind) in errors.errors() {
        let mut path = prefix.to_vec();
        path.push(camel_case(field));

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                issues.extend(field_errors.iter().map(|e| issue_from_error(path.clone(), e)));
            }
            ValidationErrorsKind::Struct(nested) => collect_issues(nested, &path, issues),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let mut item_path = path.clone();
                    item_path.push(index.to_string());
                    collect_issues(nested, &item_path, issues);
                }
            }
        }
    }
}

fn issue_from_error(path: Vec<String>, error: &ValidationError) -> Issue {
    let declared = error.message.as_ref().map(|m| m.to_string());
    let param = |name: &str| error.params.get(name).cloned();

    match &*error.code {
        "required" => {
            let mut issue = Issue::required(path);
            if let Some(message) = declared {
                issue.message = message;
            }
            issue
        }
        "range" => {
            let value = param("value").and_then(|v| v.as_f64());
            let min = param("min");
            let below = matches!(
                (value, min.as_ref().and_then(Value::as_f64)),
                (Some(v), Some(m)) if v < m
            );
            if below {
                bounded_issue(path, IssueCode::TooSmall, min, declared, |m| {
                    format!("Number must be greater than or equal to {m}")
                })
            } else {
                bounded_issue(path, IssueCode::TooBig, param("max"), declared, |m| {
                    format!("Number must be less than or equal to {m}")
                })
            }
        }
        "length" => {
            let length = param("value")
                .as_ref()
                .and_then(Value::as_str)
                .map(|s| s.chars().count() as f64);
            let min = param("min");
            let below = matches!(
                (length, min.as_ref().and_then(Value::as_f64)),
                (Some(l), Some(m)) if l < m
            );
            if below {
                bounded_issue(path, IssueCode::TooSmall, min, declared, |m| {
                    format!("String must contain at least {m} character(s)")
                })
            } else {
                bounded_issue(path, IssueCode::TooBig, param("max"), declared, |m| {
                    format!("String must contain at most {m} character(s)")
                })
            }
        }
        "invalid_enum_value" => {
            let options: Vec<String> = param("options")
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default();
            let received = param("value")
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default();
            let message = declared.unwrap_or_else(|| {
                let expected: Vec<String> = options.iter().map(|o| format!("'{o}'")).collect();
                format!(
                    "Invalid enum value. Expected {}, received '{received}'",
                    expected.join(" | ")
                )
            });
            let mut issue = Issue::new(IssueCode::InvalidEnumValue, path, message);
            issue.options = Some(options);
            issue
        }
        code => {
            let message = declared.unwrap_or_else(|| format!("Invalid value ({code})"));
            Issue::new(IssueCode::Custom, path, message)
        }
    }
}

fn bounded_issue(
    path: Vec<String>,
    code: IssueCode,
    bound: Option<Value>,
    declared: Option<String>,
    describe: impl Fn(&str) -> String,
) -> Issue {
    let message = declared
        .or_else(|| bound.as_ref().map(|b| describe(&display_bound(b))))
        .unwrap_or_else(|| "Value is out of range".to_string());
    let mut issue = Issue::new(code, path, message);
    issue.inclusive = Some(true);
    match code {
        IssueCode::TooSmall => issue.minimum = bound,
        _ => issue.maximum = bound,
    }
    issue
}

/// Integral bounds print without a fraction whatever numeric type recorded them
fn display_bound(bound: &Value) -> String {
    match bound.as_f64() {
        Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
        _ => bound.to_string(),
    }
}

/// `doors_qty` -> `doorsQty`; names already in camelCase pass through.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
