use serde::Serialize;
use thiserror::Error;

/// Maximum length, in characters, of any short text field.
pub const SHORT_TEXT_MAX: usize = 100;

/// A single field that failed its schema at persist time.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Validation error: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validates a short, non-blank text value of at most `SHORT_TEXT_MAX` characters.
pub fn validate_short_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{field} cannot be empty")));
    }
    let len = value.chars().count();
    if len > SHORT_TEXT_MAX {
        return Err(ValidationError::new(
            field,
            format!("{field} must be at most {SHORT_TEXT_MAX} characters (got {len})"),
        ));
    }
    Ok(value)
}

/// Validates that `value` lies within `[min, max]`.
pub fn validate_bounded_number(
    field: &str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("{field} must be between {min} and {max} (got {value})"),
        ));
    }
    Ok(value)
}
