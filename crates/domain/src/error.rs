//! Error types shared by the store, the serializers and the HTTP layer.
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a required field is absent.
pub const FIELD_REQUIRED: &str = "This field is required.";
/// Message used when a text field is present but blank.
pub const FIELD_BLANK: &str = "This field may not be blank.";

/// Result type with [`Error`] as the error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by domain operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// One or more fields of the input were missing or invalid.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The caller is not authenticated.
    #[error("authentication credentials were not provided")]
    Unauthorized,
    /// The caller is authenticated but may not perform the action.
    #[error("you do not have permission to perform this action")]
    Forbidden,
    /// The store failed for a reason unrelated to the input.
    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Create a `NotFound` error.
    #[inline]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a `Validation` error carrying a single field message.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }
}

/// Validation messages keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty set of field errors.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Append a message to `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.0.entry(field.into()).or_default().push(message.into());
        self
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if no field has a message.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when empty, [`Error::Validation`] otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}
