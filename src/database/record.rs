//! Field-level validation shared by the API handlers and the CLI forms.
//!
//! Form records arrive with every field optional. A `FieldCheck` walks the
//! fields, collects one message per bad field, and only yields the validated
//! values when nothing was rejected.

use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Errors that can occur while validating a form record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RecordError {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl RecordError {
    pub fn new(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        Self {
            message: message.into(),
            field_errors,
        }
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.to_string(), message.clone());
        Self { message, field_errors }
    }
}

/// Accumulates per-field problems while a form is being validated
#[derive(Debug, Default)]
pub struct FieldCheck {
    missing: Vec<String>,
    field_errors: BTreeMap<String, String>,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required text: absent, empty and whitespace-only values are all missing.
    pub fn required_text(&mut self, field: &str, value: &Option<String>) -> String {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                self.missing(field);
                String::new()
            }
        }
    }

    /// Optional text: blank values collapse to `None`.
    pub fn optional_text(&mut self, value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required_uuid(&mut self, field: &str, value: &Option<String>) -> Uuid {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => self.parse_uuid(field, v).unwrap_or_default(),
            _ => {
                self.missing(field);
                Uuid::nil()
            }
        }
    }

    /// Optional reference: absent, null, empty and the literal `"null"` all mean no reference.
    pub fn optional_uuid(&mut self, field: &str, value: &Option<String>) -> Option<Uuid> {
        match value.as_deref().map(str::trim) {
            None | Some("") | Some("null") => None,
            Some(v) => self.parse_uuid(field, v),
        }
    }

    /// Non-negative integer given either as a JSON number or as a string of digits.
    pub fn required_count(&mut self, field: &str, value: &Option<Value>) -> i32 {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.missing(field);
                return 0;
            }
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    self.missing(field);
                    return 0;
                }
                if s.chars().all(|c| c.is_ascii_digit()) {
                    s.parse::<i64>().ok()
                } else {
                    None
                }
            }
            Some(_) => None,
        };

        match parsed.and_then(|n| i32::try_from(n).ok()).filter(|n| *n >= 0) {
            Some(n) => n,
            None => {
                self.reject(field, "Must be a non-negative whole number");
                0
            }
        }
    }

    /// Required value parsed with `FromStr`; `expected` describes the accepted values.
    pub fn required_parsed<T: std::str::FromStr>(
        &mut self,
        field: &str,
        value: &Option<String>,
        expected: &str,
    ) -> Option<T> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => match v.parse::<T>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    self.reject(field, format!("Must be one of {}", expected));
                    None
                }
            },
            _ => {
                self.missing(field);
                None
            }
        }
    }

    pub fn missing(&mut self, field: &str) {
        self.missing.push(field.to_string());
        self.field_errors
            .insert(field.to_string(), "This field is required".to_string());
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors.insert(field.to_string(), message.into());
    }

    /// `missing_message` is used when only required fields were absent.
    pub fn finish(self, missing_message: &str) -> Result<(), RecordError> {
        if self.field_errors.is_empty() {
            return Ok(());
        }
        let message = if self.missing.len() == self.field_errors.len() {
            missing_message.to_string()
        } else {
            "Invalid field values".to_string()
        };
        Err(RecordError::new(message, self.field_errors))
    }

    fn parse_uuid(&mut self, field: &str, value: &str) -> Option<Uuid> {
        match Uuid::parse_str(value) {
            Ok(id) => Some(id),
            Err(_) => {
                self.reject(field, format!("Invalid UUID format: {}", value));
                None
            }
        }
    }
}
