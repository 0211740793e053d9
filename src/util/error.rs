//! Error types for the CityJSON library.

use thiserror::Error;

/// Main error type for CityJSON operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A JSON token of the wrong kind where an object/array/scalar was expected
    #[error("Unexpected JSON value: expected {expected}, got {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    /// A required member is missing from a JSON object
    #[error("Missing member: {0}")]
    MissingMember(&'static str),

    /// The document violates the CityJSON structure
    #[error("Invalid CityJSON document: {0}")]
    InvalidDocument(String),

    /// Registry conflict (duplicate discriminator or extension attribute)
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Underlying JSON parse or print error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-document error from a message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub(crate) fn unexpected(expected: &'static str, found: &serde_json::Value) -> Self {
        Self::UnexpectedToken {
            expected,
            found: json_kind(found),
        }
    }
}

/// Conflict raised by the type registry when a binding would be overwritten.
///
/// Registration is rejected for any discriminator or attribute name that is
/// already bound, identical bindings included. Existing bindings are never
/// touched by a failed registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("The city object type '{0}' is already registered")]
    CityObjectTypeBound(String),

    #[error("The semantic surface type '{0}' is already registered")]
    SemanticSurfaceTypeBound(String),

    #[error("The extension attribute '{name}' is already registered for {target}")]
    ExtensionAttributeBound { name: String, target: String },

    #[error("The type name must not be empty")]
    EmptyTypeName,

    #[error("The attribute name must not be empty")]
    EmptyAttributeName,
}

/// Result type alias for CityJSON operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Human-readable name of a JSON value kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::MissingMember("type");
        assert!(e.to_string().contains("type"));

        let e = Error::unexpected("array", &serde_json::json!({}));
        assert!(e.to_string().contains("array"));
        assert!(e.to_string().contains("object"));
    }

    #[test]
    fn test_registration_error_into_error() {
        let err: Error = RegistrationError::CityObjectTypeBound("Building".into()).into();
        assert!(matches!(err, Error::Registration(_)));
        assert!(err.to_string().contains("Building"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
