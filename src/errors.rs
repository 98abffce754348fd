// Copyright 2025 Cowboy AI, LLC.

//! Error types for mixin composition

use thiserror::Error;

/// Errors that can occur while composing or invoking mixed classes
///
/// The composition core itself never fails: membership queries answer `false`
/// on absent input and decorators pass body errors through untouched. These
/// variants are raised by method dispatch and by extension bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MixinError {
    /// An extension body refused to produce a derived class
    #[error("Extension {extension} failed: {reason}")]
    ExtensionFailed {
        /// Name of the extension whose body failed
        extension: String,
        /// Why the body failed
        reason: String,
    },

    /// No class in the receiver's ancestry defines the method
    #[error("Method not found: {class}.{method}")]
    MethodNotFound {
        /// Class the lookup started from
        class: String,
        /// Method that was requested
        method: String,
    },

    /// A super call found nothing above the defining class
    #[error("No super method {method} above {class}")]
    NoSuperMethod {
        /// Class that defined the running method
        class: String,
        /// Method that was requested
        method: String,
    },

    /// A method received arguments it cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic mixin error
    #[error("Mixin error: {0}")]
    Generic(String),
}

/// Result type for mixin operations
pub type MixinResult<T> = Result<T, MixinError>;

impl From<serde_json::Error> for MixinError {
    fn from(err: serde_json::Error) -> Self {
        MixinError::SerializationError(err.to_string())
    }
}

impl MixinError {
    /// Create a generic mixin error
    pub fn generic(msg: impl Into<String>) -> Self {
        MixinError::Generic(msg.into())
    }

    /// Create an error reported by an extension body
    pub fn extension_failed(extension: impl Into<String>, reason: impl Into<String>) -> Self {
        MixinError::ExtensionFailed {
            extension: extension.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a method lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MixinError::MethodNotFound { .. } | MixinError::NoSuperMethod { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error creation and display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[MixinError] -->|Display| B[Error Message]
    ///     A -->|Clone| C[Cloned Error]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = MixinError::extension_failed("Serializable", "base is sealed");
        assert_eq!(err.to_string(), "Extension Serializable failed: base is sealed");

        let err = MixinError::MethodNotFound {
            class: "Widget".to_string(),
            method: "render".to_string(),
        };
        assert_eq!(err.to_string(), "Method not found: Widget.render");

        let err = MixinError::NoSuperMethod {
            class: "Base".to_string(),
            method: "bar".to_string(),
        };
        assert_eq!(err.to_string(), "No super method bar above Base");

        let err = MixinError::InvalidArgument("expected a string".to_string());
        assert_eq!(err.to_string(), "Invalid argument: expected a string");

        let err = MixinError::generic("Something went wrong");
        assert_eq!(err.to_string(), "Mixin error: Something went wrong");
    }

    #[test]
    fn test_error_classification() {
        let missing = MixinError::MethodNotFound {
            class: "A".to_string(),
            method: "b".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(MixinError::NoSuperMethod {
            class: "A".to_string(),
            method: "b".to_string(),
        }
        .is_not_found());
        assert!(!MixinError::generic("x").is_not_found());

        let cloned = missing.clone();
        assert_eq!(cloned, missing);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: MixinError = json_err.into();
        assert!(matches!(err, MixinError::SerializationError(_)));
    }
}
