//! Field-level validation of transfer shapes

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field name → messages. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-message error set
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Required text whose trimmed length must lie in `min..=max` characters.
    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len == 0 && min > 0 {
            self.add(field, format!("The field {field} is required"));
        } else if len < min || len > max {
            self.add(
                field,
                format!("The field {field} must be between {min} and {max} characters"),
            );
        }
    }

    /// Optional text with an upper bound only.
    pub fn check_max_length(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value
            && value.chars().count() > max
        {
            self.add(field, format!("The field {field} must be at most {max} characters"));
        }
    }

    pub fn check_range<T>(&mut self, field: &str, value: T, min: T, max: T)
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        if !(value >= min && value <= max) {
            self.add(field, format!("The field {field} must be between {min} and {max}"));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by creation and patch shapes.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_messages_per_field() {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", "   ", 1, 40);
        errors.check_length("title", &"x".repeat(41), 1, 40);
        errors.check_range("score", 6, 1, 5);
        errors.check_range("latitude", f64::NAN, -90.0, 90.0);
        errors.check_max_length("biography", None, 10);

        assert_eq!(errors.get("name").map(<[String]>::len), Some(1));
        assert!(errors.get("title").is_some());
        assert!(errors.get("score").is_some());
        assert!(errors.get("latitude").is_some());
        assert!(errors.get("biography").is_none());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_serializes_as_object() {
        let errors = ValidationErrors::single("score", "bad");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"score": ["bad"]})
        );
        assert_eq!(errors.to_string(), "score: bad");
    }
}
