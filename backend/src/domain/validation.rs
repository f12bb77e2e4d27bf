//! Field-keyed validation error collection.

use std::collections::BTreeMap;

use serde_json::json;

use super::Error;

/// Message used when a required field is absent.
pub const FIELD_REQUIRED: &str = "This field is required.";

/// Accumulates validation messages per field so that every problem in a
/// payload is reported at once.
///
/// # Examples
/// ```
/// use foodgram::domain::FieldErrors;
///
/// let mut errors = FieldErrors::default();
/// errors.add("name", "This field is required.");
/// let err = errors.into_result().expect_err("name missing");
/// assert_eq!(err.message(), "Validation failed");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Record `message` against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Whether no messages were recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Convert into a `400` error when messages were recorded.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// Convert into a `400` error regardless of content.
    pub fn into_error(self) -> Error {
        Error::invalid_request("Validation failed").with_details(json!({
            "code": "validation_failed",
            "fields": self.fields,
        }))
    }

    /// Single-field shortcut.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Error {
        let mut errors = Self::default();
        errors.add(field, message);
        errors.into_error()
    }
}
