//! Error types for the trait injector
//!
//! Errors carry the workload kind or binding field they concern so that the
//! admission response built from them points at the actual problem.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for injection operations
#[derive(Debug, Error)]
pub enum Error {
    /// The raw workload document does not have the expected shape
    #[error("decode error for {kind}: {message}")]
    Decode {
        /// Workload kind the document was decoded as (e.g., "StatefulSet")
        kind: String,
        /// Description of what failed
        message: String,
    },

    /// The binding cannot be applied as written
    #[error("invalid binding: {message}")]
    InvalidBinding {
        /// Description of what's invalid
        message: String,
        /// The offending field path (e.g., "from.secret.name")
        field: Option<String>,
    },

    /// A patch value could not be serialized
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
    },

    /// A configuration value could not be parsed
    #[error("config error: {message}")]
    Config {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a decode error without workload kind context
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            kind: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
        }
    }

    /// Create a decode error for a specific workload kind
    pub fn decode_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            kind: kind.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid binding error
    pub fn invalid_binding(msg: impl Into<String>) -> Self {
        Self::InvalidBinding {
            message: msg.into(),
            field: None,
        }
    }

    /// Create an invalid binding error naming the offending field
    pub fn invalid_binding_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidBinding {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Short machine-readable category, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Decode { .. } => "decode",
            Error::InvalidBinding { .. } => "invalid_binding",
            Error::Serialization { .. } => "serialization",
            Error::Config { .. } => "config",
        }
    }

    /// Get the binding field path if this error names one
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::InvalidBinding { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Errors surfaced to the admission webhook
    // ==========================================================================

    /// Story: A workload that isn't valid JSON fails decoding with kind context
    #[test]
    fn story_decode_error_names_the_workload_kind() {
        let err = Error::decode_for_kind("StatefulSet", "expected value at line 1 column 1");
        assert!(err.to_string().contains("decode error for StatefulSet"));
        assert!(err.to_string().contains("line 1 column 1"));
        assert_eq!(err.kind(), "decode");
    }

    /// Story: serde failures convert into decode errors without kind context
    #[test]
    fn story_serde_error_becomes_decode_error() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::from(source);
        match &err {
            Error::Decode { kind, .. } => assert_eq!(kind, UNKNOWN_CONTEXT),
            other => panic!("Expected Decode variant, got {other:?}"),
        }
    }

    /// Story: An env binding without a secret points at the missing field
    #[test]
    fn story_invalid_binding_carries_field_path() {
        let err = Error::invalid_binding_field("from.secret.name", "env injection needs a secret");
        assert_eq!(err.field(), Some("from.secret.name"));
        assert!(err.to_string().starts_with("invalid binding"));
        assert_eq!(err.kind(), "invalid_binding");

        let err = Error::invalid_binding("no source");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn serialization_and_config_errors_display() {
        assert!(Error::serialization("bad value")
            .to_string()
            .contains("serialization error: bad value"));
        assert!(Error::config("unknown policy")
            .to_string()
            .contains("config error: unknown policy"));
        assert_eq!(Error::config("x").field(), None);
    }
}
